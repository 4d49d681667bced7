//! The shell facade: one object owning the job registry, the signal tasks
//! and the builtins.
//!
//! The REPL hands it one parsed [`Command`] at a time via
//! [`Shell::execute`] and drains completion notices with
//! [`Shell::notify_completed`] before each prompt.

use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use jobsh_types::{Command, ExecResult, JobInfo};

use crate::config::ShellConfig;
use crate::error::{ShellError, ShellResult};
use crate::scheduler::{self, JobManager};
use crate::spawn;
use crate::terminal::TerminalState;
use crate::tools::{ExecContext, ToolArgs, ToolRegistry, ToolSchema, register_builtins};

/// A running shell session.
pub struct Shell {
    config: ShellConfig,
    jobs: Arc<JobManager>,
    tools: ToolRegistry,
    ctx: Mutex<ExecContext>,
    tasks: Vec<JoinHandle<()>>,
}

impl Shell {
    /// Start a shell: registers the SIGCHLD reaper and, if configured, the
    /// SIGINT/SIGTSTP forwarders and terminal hand-off.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: ShellConfig) -> ShellResult<Self> {
        let terminal = if config.job_control { TerminalState::acquire() } else { None };
        let job_control = terminal.is_some();
        let jobs = Arc::new(JobManager::with_terminal(terminal));

        let mut tasks = vec![
            scheduler::spawn_reaper(jobs.clone(), config.notify_immediately).map_err(ShellError::SignalSetup)?,
        ];
        if config.forward_signals {
            tasks.push(scheduler::spawn_forwarders(jobs.clone()).map_err(ShellError::SignalSetup)?);
        }

        let mut tools = ToolRegistry::new();
        register_builtins(&mut tools);
        let ctx = Mutex::new(ExecContext::new(jobs.clone(), &config));

        tracing::debug!(name = %config.name, forward_signals = config.forward_signals, job_control, "shell started");
        Ok(Self {
            config,
            jobs,
            tools,
            ctx,
            tasks,
        })
    }

    /// Run one command to completion (or until it is backgrounded/stopped).
    ///
    /// Builtins run in-process; anything else is spawned. Only fatal errors
    /// are returned as `Err`. Everything else, "command not found"
    /// included, comes back as a failed [`ExecResult`].
    pub async fn execute(&self, command: &Command) -> ShellResult<ExecResult> {
        let Some(program) = command.program() else {
            return Ok(ExecResult::default());
        };

        if let Some(tool) = self.tools.get(program) {
            let args = ToolArgs::from_words(command.args());
            let result = {
                let mut ctx = self.ctx.lock().await;
                tool.execute(args, &mut ctx).await
            };
            return Ok(redirect_builtin(command, result));
        }

        match spawn::launch(command, &self.jobs, &self.config).await {
            Ok(result) => Ok(result),
            Err(e) if e.is_fatal() => {
                tracing::error!(error = %e, "process creation failed");
                Err(e)
            }
            Err(e) => Ok(e.into_result()),
        }
    }

    /// Drain finished jobs into completion notices, oldest first.
    ///
    /// Each finished job is reported exactly once. While a foreground job
    /// runs nothing is returned; the reports are kept for the next call.
    pub async fn notify_completed(&self) -> Vec<String> {
        self.jobs.take_finished().await.iter().map(JobInfo::to_string).collect()
    }

    /// Interrupt every job before exiting.
    pub async fn shutdown(&self) {
        tracing::debug!("shutting down, interrupting jobs");
        self.jobs.shutdown().await;
    }

    /// Forward an interrupt to the foreground job. False if there is none.
    pub async fn forward_interrupt(&self) -> bool {
        scheduler::forward_interrupt(&self.jobs).await
    }

    /// Stop the foreground job, moving it into the registry.
    pub async fn forward_stop(&self) -> Option<JobInfo> {
        scheduler::forward_stop(&self.jobs).await
    }

    /// The job registry.
    pub fn jobs(&self) -> &Arc<JobManager> {
        &self.jobs
    }

    /// True if `name` is a builtin.
    pub fn is_builtin(&self, name: &str) -> bool {
        self.tools.contains(name)
    }

    /// Schemas of all builtins, for help output.
    pub fn tool_schemas(&self) -> Vec<ToolSchema> {
        self.tools.schemas()
    }

    /// The configuration this shell was started with.
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Apply redirections to a builtin's result.
///
/// Builtins have no process to rebind, so output text is written to the
/// target here. An input target only has to be readable.
fn redirect_builtin(command: &Command, mut result: ExecResult) -> ExecResult {
    if let Some(path) = &command.input
        && let Err(source) = File::open(path)
    {
        return ShellError::Redirect { path: path.clone(), source }.into_result();
    }
    if let Some(path) = &command.output {
        let written = File::create(path).and_then(|mut file| file.write_all(result.out.as_bytes()));
        if let Err(source) = written {
            return ShellError::Redirect { path: path.clone(), source }.into_result();
        }
        result.out.clear();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_command_does_nothing() {
        let shell = Shell::new(ShellConfig::transient()).unwrap();
        let result = shell.execute(&Command::default()).await.unwrap();
        assert_eq!(result, ExecResult::default());
    }

    #[tokio::test]
    async fn builtins_are_found_before_path() {
        let shell = Shell::new(ShellConfig::transient()).unwrap();
        assert!(shell.is_builtin("jobs"));
        assert!(!shell.is_builtin("sleep"));
        assert_eq!(shell.tool_schemas().len(), 4);
    }

    #[tokio::test]
    async fn builtin_output_can_be_redirected() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("jobs.txt");
        let shell = Shell::new(ShellConfig::transient()).unwrap();
        shell
            .jobs()
            .lock()
            .await
            .push_background(nix::unistd::Pid::from_raw(i32::MAX - 4), "sleep 9 &");

        let result = shell.execute(&Command::new(["jobs"]).with_output(&out)).await.unwrap();
        assert!(result.ok());
        assert!(result.out.is_empty());
        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.contains("sleep 9 &"));
    }

    #[tokio::test]
    async fn unknown_command_is_not_fatal() {
        let shell = Shell::new(ShellConfig::transient()).unwrap();
        let result = shell.execute(&Command::new(["no-such-command-jobsh"])).await.unwrap();
        assert_eq!(result.code, 127);
        assert_eq!(result.err, "no-such-command-jobsh: command not found");
    }
}
