//! Signal-driven scheduler tasks: the SIGCHLD reaper and the SIGINT/SIGTSTP
//! forwarders.
//!
//! ```text
//!   SIGCHLD ──▶ reaper task ──▶ JobManager::reap ──▶ JobTable::apply
//!                                  (table lock held while waiting)
//!   SIGINT  ──┐
//!   SIGTSTP ──┴▶ forwarder task ──▶ killpg(foreground job)
//! ```
//!
//! Both run as Tokio tasks fed by `tokio::signal::unix` streams, so all
//! real work happens outside the async-signal context. While a job owns the
//! terminal the keyboard signals go to its group directly, so the
//! forwarders only see signals sent to the shell itself.

use std::io;
use std::sync::Arc;

use nix::sys::signal::{Signal, killpg};
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinHandle;

use super::job::{JobInfo, JobManager};

/// Start the reaper.
///
/// The SIGCHLD stream is registered before this returns, so children
/// spawned afterwards cannot slip past it. With `notify_immediately`,
/// finished background jobs are reported right after each drain (held back
/// while a foreground job runs).
pub fn spawn_reaper(jobs: Arc<JobManager>, notify_immediately: bool) -> io::Result<JoinHandle<()>> {
    let mut sigchld = signal(SignalKind::child())?;
    Ok(tokio::spawn(async move {
        while sigchld.recv().await.is_some() {
            let transitions = jobs.reap().await;
            if transitions.is_empty() {
                continue;
            }
            if notify_immediately {
                for job in jobs.take_finished().await {
                    println!("{}", job);
                }
            }
        }
        tracing::debug!("SIGCHLD stream closed, reaper exiting");
    }))
}

/// Start the SIGINT/SIGTSTP forwarders.
///
/// Registering the streams replaces the default dispositions, so the
/// keystrokes can no longer kill or stop the shell itself.
pub fn spawn_forwarders(jobs: Arc<JobManager>) -> io::Result<JoinHandle<()>> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut stop = signal(SignalKind::from_raw(Signal::SIGTSTP as i32))?;
    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                received = interrupt.recv() => {
                    if received.is_none() {
                        break;
                    }
                    forward_interrupt(&jobs).await;
                }
                received = stop.recv() => {
                    if received.is_none() {
                        break;
                    }
                    forward_stop(&jobs).await;
                }
            }
        }
    }))
}

/// Interrupt the foreground job's process group.
///
/// Returns false when there is no foreground job. The registry is not
/// touched; the resulting exit reaches the reaper like any other.
pub async fn forward_interrupt(jobs: &JobManager) -> bool {
    let Some(pid) = jobs.foreground_pid().await else {
        return false;
    };
    if let Err(e) = killpg(pid, Signal::SIGINT) {
        tracing::warn!(pid = pid.as_raw(), error = %e, "failed to interrupt foreground job");
    }
    true
}

/// Stop the foreground job.
///
/// The job moves into the registry as `Stopped` (releasing the foreground
/// wait) before SIGTSTP is sent to its process group, all under the table
/// lock. Returns the stopped job, or `None` when nothing was in the
/// foreground.
pub async fn forward_stop(jobs: &JobManager) -> Option<JobInfo> {
    let mut table = jobs.lock().await;
    let info = table.stop_foreground()?;
    let pgid = nix::unistd::Pid::from_raw(info.pid as i32);
    if let Err(e) = killpg(pgid, Signal::SIGTSTP) {
        tracing::warn!(pid = info.pid, error = %e, "failed to stop foreground job");
    }
    Some(info)
}
