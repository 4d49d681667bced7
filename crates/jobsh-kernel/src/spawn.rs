//! Process spawner: turns a parsed [`Command`] into a tracked job.
//!
//! Every child leads its own process group, so signals aimed at a job's
//! group never reach the shell. Redirection targets are opened here, in
//! the shell, and handed to the child as its standard streams; a target
//! that cannot be opened fails the command before anything is spawned.
//!
//! When the shell holds the terminal, a foreground job is made the
//! terminal's foreground group before the shell waits on it.

use std::fs::File;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Stdio;

use nix::unistd::Pid;

use jobsh_types::{Command, ExecResult};

use crate::config::ShellConfig;
use crate::error::{ShellError, ShellResult};
use crate::resolve::resolve_in_env;
use crate::scheduler::{ForegroundOutcome, JobManager};

/// Launch an external command.
///
/// Background commands are registered and return at once. Foreground
/// commands occupy the foreground slot until they exit, are killed, or
/// stop. The foreground wait relies on a running reaper (see
/// [`spawn_reaper`](crate::scheduler::spawn_reaper)).
///
/// Resolution, redirection and spawn errors are returned as `Err`; the
/// caller decides which are fatal via [`ShellError::is_fatal`].
#[tracing::instrument(level = "debug", skip(command, jobs, config), fields(command = %command.text))]
pub async fn launch(command: &Command, jobs: &JobManager, config: &ShellConfig) -> ShellResult<ExecResult> {
    let Some(program) = command.program() else {
        return Ok(ExecResult::default());
    };

    let executable = resolve_in_env(program).ok_or_else(|| ShellError::CommandNotFound(program.to_string()))?;
    tracing::debug!(executable = %executable.display(), "resolved external command");

    let mut cmd = std::process::Command::new(&executable);
    cmd.arg0(program).args(command.args()).process_group(0);
    if let Some(path) = &command.input {
        cmd.stdin(Stdio::from(open_redirect(path, |p| File::open(p))?));
    }
    if let Some(path) = &command.output {
        cmd.stdout(Stdio::from(open_redirect(path, |p| File::create(p))?));
    }
    if let Some(term) = jobs.terminal() {
        term.prepare_child(&mut cmd, !command.background);
    }

    // Held until the job is recorded, so the reaper cannot see the child first
    let mut table = jobs.lock().await;
    let child = cmd.spawn().map_err(|e| ShellError::from_spawn(program, e))?;
    let pid = Pid::from_raw(child.id() as i32);
    // Dropping a std Child neither waits nor kills; the reaper owns it now
    drop(child);

    if command.background {
        let id = table.push_background(pid, command.text.clone());
        drop(table);
        tracing::debug!(job = %id, pid = pid.as_raw(), "started background job");
        return Ok(if config.announce_background {
            ExecResult::success(format!("[{}] {}\n", id, pid))
        } else {
            ExecResult::default()
        });
    }

    table.set_foreground(pid, command.text.clone(), None);
    jobs.give_terminal_to(pid);
    drop(table);
    tracing::debug!(pid = pid.as_raw(), "started foreground job");

    Ok(foreground_result(jobs.wait_foreground(pid).await))
}

fn open_redirect(path: &Path, open: impl FnOnce(&Path) -> std::io::Result<File>) -> ShellResult<File> {
    open(path).map_err(|source| ShellError::Redirect {
        path: path.to_path_buf(),
        source,
    })
}

/// Exit status (and stop notice) for a finished foreground wait.
///
/// Shared by plain launches and `fg`.
pub fn foreground_result(outcome: Option<ForegroundOutcome>) -> ExecResult {
    match outcome {
        Some(ForegroundOutcome::Stopped(info)) => {
            let code = ForegroundOutcome::Stopped(info.clone()).exit_code();
            ExecResult::failure(code, format!("\n{}", info))
        }
        Some(outcome) => ExecResult::from_output(outcome.exit_code(), "", ""),
        None => ExecResult::failure(1, "lost track of foreground job"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobsh_types::{JobId, JobInfo, JobStatus};
    use nix::sys::signal::Signal;

    #[test]
    fn foreground_codes() {
        assert_eq!(foreground_result(Some(ForegroundOutcome::Exited(0))).code, 0);
        assert_eq!(foreground_result(Some(ForegroundOutcome::Exited(7))).code, 7);
        assert_eq!(
            foreground_result(Some(ForegroundOutcome::Signaled(Signal::SIGKILL))).code,
            137
        );
        assert!(!foreground_result(None).ok());
    }

    #[test]
    fn stop_produces_a_notice() {
        let info = JobInfo {
            id: JobId(2),
            command: "sleep 100".into(),
            status: JobStatus::Stopped,
            pid: 4242,
        };
        let result = foreground_result(Some(ForegroundOutcome::Stopped(info)));
        assert_eq!(result.code, 148);
        assert!(result.err.contains("[2]"));
        assert!(result.err.contains("Stopped"));
        assert!(result.err.contains("sleep 100"));
    }

    #[tokio::test]
    async fn missing_program_is_not_found() {
        let jobs = JobManager::new();
        let config = ShellConfig::transient();
        let command = Command::new(["definitely-not-a-real-program-xyz"]);
        let err = launch(&command, &jobs, &config).await.unwrap_err();
        assert!(matches!(err, ShellError::CommandNotFound(ref name) if name == "definitely-not-a-real-program-xyz"));
        assert!(jobs.list().await.is_empty());
    }

    #[tokio::test]
    async fn unreadable_input_fails_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = JobManager::new();
        let config = ShellConfig::transient();
        let command = Command::new(["cat"]).with_input(dir.path().join("absent.txt"));
        let err = launch(&command, &jobs, &config).await.unwrap_err();
        assert!(matches!(err, ShellError::Redirect { .. }));
        assert!(!jobs.lock().await.has_foreground());
    }
}
