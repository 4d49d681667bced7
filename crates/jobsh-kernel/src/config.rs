//! Shell configuration.

use std::path::PathBuf;

/// Configuration for a [`Shell`](crate::Shell).
///
/// The presets cover the two ways a shell is driven: a human at a terminal
/// (`interactive`) and programmatic use such as tests or `-c` (`transient`).
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Name of this shell (for logs).
    pub name: String,

    /// Print `[n] pid` when a job is started in the background.
    pub announce_background: bool,

    /// Make `fg`/`bg` fail with "no such job" for an unknown job number.
    ///
    /// When false, an unknown number is a silent no-op.
    pub report_unknown_jobs: bool,

    /// Report finished background jobs as soon as they are reaped instead
    /// of waiting for the next prompt.
    ///
    /// Reports are still held back while a foreground job is running.
    pub notify_immediately: bool,

    /// Translate SIGINT/SIGTSTP received by the shell into signals for the
    /// foreground job's process group.
    pub forward_signals: bool,

    /// Give the terminal to each foreground job while the shell waits on it.
    ///
    /// Only takes effect when stdin is a terminal owned by the shell's
    /// process group; otherwise jobs never get the terminal.
    pub job_control: bool,

    /// Directory for `cd` with no argument. `None` reads `$HOME` each time.
    pub home: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::transient()
    }
}

impl ShellConfig {
    /// Config for a shell attached to a terminal.
    pub fn interactive() -> Self {
        Self {
            name: "interactive".to_string(),
            announce_background: true,
            report_unknown_jobs: false,
            notify_immediately: false,
            forward_signals: true,
            job_control: true,
            home: None,
        }
    }

    /// Config for non-interactive use: quiet, no signal forwarding.
    ///
    /// Leaving SIGINT/SIGTSTP alone keeps the default dispositions, which is
    /// what a test harness or a `-c` invocation expects.
    pub fn transient() -> Self {
        Self {
            name: "transient".to_string(),
            announce_background: false,
            report_unknown_jobs: false,
            notify_immediately: false,
            forward_signals: false,
            job_control: false,
            home: None,
        }
    }

    /// Set the shell name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Enable or disable the `[n] pid` line for background jobs.
    pub fn with_announce_background(mut self, announce: bool) -> Self {
        self.announce_background = announce;
        self
    }

    /// Enable or disable "no such job" errors from `fg`/`bg`.
    pub fn with_report_unknown_jobs(mut self, report: bool) -> Self {
        self.report_unknown_jobs = report;
        self
    }

    /// Enable or disable immediate completion reports.
    pub fn with_notify_immediately(mut self, notify: bool) -> Self {
        self.notify_immediately = notify;
        self
    }

    /// Enable or disable SIGINT/SIGTSTP forwarding.
    pub fn with_forward_signals(mut self, forward: bool) -> Self {
        self.forward_signals = forward;
        self
    }

    /// Enable or disable handing the terminal to foreground jobs.
    pub fn with_job_control(mut self, enabled: bool) -> Self {
        self.job_control = enabled;
        self
    }

    /// Override the home directory used by `cd`.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }
}
