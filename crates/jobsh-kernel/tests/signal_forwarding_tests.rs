//! Keyboard signals delivered to the shell process itself.
//!
//! Kept in its own test binary: the forwarders replace the process-wide
//! SIGINT/SIGTSTP dispositions, and raising those signals at a process
//! without them would kill or stop the whole test run.

use std::sync::Arc;
use std::time::Duration;

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tokio::time::timeout;

use jobsh_kernel::{Command, ExecResult, JobStatus, Shell, ShellConfig};

async fn wait_for_foreground(shell: &Shell) {
    for _ in 0..500 {
        if shell.jobs().foreground_pid().await.is_some() {
            // Let the child get past exec before it is signalled
            tokio::time::sleep(Duration::from_millis(200)).await;
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("foreground job never started");
}

async fn run_in_foreground_until(shell: &Arc<Shell>, signal: Signal) -> ExecResult {
    let running = {
        let shell = shell.clone();
        tokio::spawn(async move { shell.execute(&Command::new(["sleep", "30"])).await })
    };
    wait_for_foreground(shell).await;
    kill(Pid::this(), signal).expect("failed to signal the shell");

    timeout(Duration::from_secs(5), running)
        .await
        .unwrap_or_else(|_| panic!("{signal} was not forwarded"))
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn keyboard_signals_reach_the_foreground_job() {
    let shell = Arc::new(Shell::new(ShellConfig::transient().with_forward_signals(true)).unwrap());

    let stopped = run_in_foreground_until(&shell, Signal::SIGTSTP).await;
    assert_eq!(stopped.code, 148);
    assert!(stopped.err.contains("Stopped"), "err: {:?}", stopped.err);
    let listed = shell.jobs().list().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, JobStatus::Stopped);

    let interrupted = run_in_foreground_until(&shell, Signal::SIGINT).await;
    assert_eq!(interrupted.code, 130);
    // Only the stopped job is left, and the shell itself survived both
    assert_eq!(shell.jobs().list().await.len(), 1);
    assert!(shell.jobs().foreground_pid().await.is_none());

    shell.shutdown().await;
}
