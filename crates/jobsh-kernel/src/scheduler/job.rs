//! Job registry for jobsh.
//!
//! [`JobTable`] holds every process the shell tracks: the ordered list of
//! background jobs, the single foreground slot, and the queue of finished
//! jobs whose report was held back while a foreground job ran. A process id
//! lives in exactly one of those places; moving a job between them is a
//! move of the owned [`Job`], never a copy.
//!
//! [`JobManager`] wraps the table in the lock the reaper shares with the
//! main control flow. Holding that lock is what keeps the reaper from
//! observing a child before its job has been recorded.

use nix::errno::Errno;
use nix::sys::signal::{Signal, killpg};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use tokio::sync::{Mutex, MutexGuard, watch};

use crate::terminal::TerminalState;

pub use jobsh_types::{JobId, JobInfo, JobStatus};

/// A tracked child process.
///
/// Not `Clone`: a job is owned by exactly one collection at a time.
#[derive(Debug, PartialEq, Eq)]
pub struct Job {
    /// Process id, also the process group id (every job leads its group).
    pub pid: Pid,
    /// Job number, assigned the first time the job enters the registry.
    pub id: Option<JobId>,
    /// Command line for display.
    pub command: String,
    /// Current status.
    pub status: JobStatus,
}

impl Job {
    fn new(pid: Pid, command: String, id: Option<JobId>) -> Self {
        Self {
            pid,
            id,
            command,
            status: JobStatus::Running,
        }
    }

    /// Listing form. Jobs that never entered the registry have no number.
    pub fn info(&self) -> Option<JobInfo> {
        Some(JobInfo {
            id: self.id?,
            command: self.command.clone(),
            status: self.status,
            pid: self.pid.as_raw() as u32,
        })
    }
}

/// How a foreground wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForegroundOutcome {
    /// Process exited with this code.
    Exited(i32),
    /// Process was killed by this signal.
    Signaled(Signal),
    /// Process was stopped and now sits in the registry.
    Stopped(JobInfo),
}

impl ForegroundOutcome {
    /// Shell exit status for the outcome.
    pub fn exit_code(&self) -> i64 {
        match self {
            ForegroundOutcome::Exited(code) => *code as i64,
            ForegroundOutcome::Signaled(sig) => 128 + *sig as i64,
            ForegroundOutcome::Stopped(_) => 128 + Signal::SIGTSTP as i64,
        }
    }
}

/// Published state of the foreground slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForegroundState {
    /// Nothing has run in the foreground yet.
    Idle,
    /// The slot holds this process and someone is waiting on it.
    Waiting(Pid),
    /// The slot was released; the outcome is for the named process.
    Finished(Pid, ForegroundOutcome),
}

/// What the reaper did with one wait status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The pid is not tracked (already removed, or not ours).
    Ignored,
    /// The foreground job exited or was killed; the slot is empty.
    ForegroundDone(Pid),
    /// The foreground job stopped and moved into the registry.
    ForegroundStopped(JobInfo),
    /// A registry job changed status.
    Updated(JobId, JobStatus),
}

/// The registry proper: background jobs, the foreground slot, deferred reports.
#[derive(Debug)]
pub struct JobTable {
    /// Background jobs, oldest first.
    jobs: Vec<Job>,
    /// The job a foreground wait is blocked on.
    foreground: Option<Job>,
    /// Finished jobs whose report was held back by a foreground wait.
    deferred: Vec<Job>,
    /// Next job number. Only ever increases.
    next_id: u64,
    state: watch::Sender<ForegroundState>,
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

impl JobTable {
    /// Create an empty table.
    pub fn new() -> Self {
        let (state, _) = watch::channel(ForegroundState::Idle);
        Self {
            jobs: Vec::new(),
            foreground: None,
            deferred: Vec::new(),
            next_id: 1,
            state,
        }
    }

    /// Receiver for foreground state changes.
    pub fn subscribe(&self) -> watch::Receiver<ForegroundState> {
        self.state.subscribe()
    }

    fn allocate_id(&mut self) -> JobId {
        let id = JobId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Record a freshly spawned background job at the tail of the registry.
    pub fn push_background(&mut self, pid: Pid, command: impl Into<String>) -> JobId {
        let id = self.allocate_id();
        self.jobs.push(Job::new(pid, command.into(), Some(id)));
        tracing::debug!(job = %id, pid = pid.as_raw(), "registered background job");
        id
    }

    /// Place a job in the foreground slot and publish `Waiting`.
    ///
    /// `id` is `Some` when the job came out of the registry via `fg`, so a
    /// later stop puts it back under the same number.
    pub fn set_foreground(&mut self, pid: Pid, command: impl Into<String>, id: Option<JobId>) {
        debug_assert!(self.foreground.is_none(), "foreground slot already occupied");
        self.foreground = Some(Job::new(pid, command.into(), id));
        self.state.send_replace(ForegroundState::Waiting(pid));
    }

    /// Pid in the foreground slot, if a foreground wait is outstanding.
    pub fn foreground_pid(&self) -> Option<Pid> {
        self.foreground.as_ref().map(|job| job.pid)
    }

    /// True while a foreground wait is outstanding.
    pub fn has_foreground(&self) -> bool {
        self.foreground.is_some()
    }

    /// Release the foreground job and publish how it ended.
    fn finish_foreground(&mut self, outcome: ForegroundOutcome) -> Option<Pid> {
        let job = self.foreground.take()?;
        self.state.send_replace(ForegroundState::Finished(job.pid, outcome));
        Some(job.pid)
    }

    /// Move the foreground job into the registry as `Stopped`.
    ///
    /// The job keeps its number if it had one; otherwise it gets the next
    /// one. The foreground wait is released with a `Stopped` outcome.
    pub fn stop_foreground(&mut self) -> Option<JobInfo> {
        let mut job = self.foreground.take()?;
        if job.id.is_none() {
            job.id = Some(self.allocate_id());
        }
        job.status = JobStatus::Stopped;
        let pid = job.pid;
        let info = job.info()?;
        self.jobs.push(job);
        self.state
            .send_replace(ForegroundState::Finished(pid, ForegroundOutcome::Stopped(info.clone())));
        tracing::debug!(job = %info.id, pid = pid.as_raw(), "foreground job stopped");
        Some(info)
    }

    /// Pick a job for `fg`/`bg`.
    ///
    /// With no number, the most recently added job that has not finished.
    /// Finished jobs are never selected: their process is already gone.
    pub fn select(&self, id: Option<JobId>) -> Option<&Job> {
        let mut live = self.jobs.iter().filter(|job| job.status != JobStatus::Done);
        match id {
            Some(id) => live.find(|job| job.id == Some(id)),
            None => live.last(),
        }
    }

    /// Mutable access to a registry job by number.
    pub fn get_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|job| job.id == Some(id))
    }

    /// Remove a job from the registry, handing over ownership.
    pub fn take(&mut self, id: JobId) -> Option<Job> {
        let index = self.jobs.iter().position(|job| job.id == Some(id))?;
        Some(self.jobs.remove(index))
    }

    /// Move a registry job into the foreground slot.
    ///
    /// The job's pid, number and command text carry over; its status becomes
    /// `Running`. Returns the pid to wait on.
    pub fn foreground_from_registry(&mut self, id: JobId) -> Option<Pid> {
        let job = self.take(id)?;
        let pid = job.pid;
        self.set_foreground(pid, job.command, job.id);
        Some(pid)
    }

    /// Registry listing, oldest first.
    pub fn list(&self) -> Vec<JobInfo> {
        self.jobs.iter().filter_map(Job::info).collect()
    }

    /// Number of jobs in the registry.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// True when the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Every pid whose state changes the reaper must collect.
    pub fn tracked_pids(&self) -> Vec<Pid> {
        self.foreground
            .iter()
            .chain(self.jobs.iter().filter(|job| job.status != JobStatus::Done))
            .map(|job| job.pid)
            .collect()
    }

    /// Apply one wait status to the table.
    ///
    /// This is the whole of the reaper's bookkeeping. It never removes a job
    /// from the registry; finished jobs are only marked `Done` and left for
    /// [`take_finished`](Self::take_finished).
    pub fn apply(&mut self, status: WaitStatus) -> Transition {
        let Some(pid) = status.pid() else {
            return Transition::Ignored;
        };

        if self.foreground_pid() == Some(pid) {
            return match status {
                WaitStatus::Exited(_, code) => {
                    self.finish_foreground(ForegroundOutcome::Exited(code));
                    Transition::ForegroundDone(pid)
                }
                WaitStatus::Signaled(_, sig, _) => {
                    self.finish_foreground(ForegroundOutcome::Signaled(sig));
                    Transition::ForegroundDone(pid)
                }
                WaitStatus::Stopped(..) => match self.stop_foreground() {
                    Some(info) => Transition::ForegroundStopped(info),
                    None => Transition::Ignored,
                },
                _ => Transition::Ignored,
            };
        }

        let Some(job) = self.jobs.iter_mut().find(|job| job.pid == pid) else {
            tracing::trace!(pid = pid.as_raw(), "status for untracked pid");
            return Transition::Ignored;
        };
        let new_status = match status {
            WaitStatus::Exited(..) | WaitStatus::Signaled(..) => JobStatus::Done,
            WaitStatus::Stopped(..) => JobStatus::Stopped,
            WaitStatus::Continued(_) => JobStatus::Running,
            _ => return Transition::Ignored,
        };
        if job.status == JobStatus::Done {
            return Transition::Ignored;
        }
        job.status = new_status;
        match job.id {
            Some(id) => Transition::Updated(id, new_status),
            None => Transition::Ignored,
        }
    }

    /// Collect finished jobs for reporting.
    ///
    /// While a foreground wait is outstanding nothing is returned: finished
    /// registry jobs move to the deferred queue so their reports cannot
    /// interleave with the foreground job's output. Otherwise the deferred
    /// queue and every `Done` registry job are removed and returned, oldest
    /// job first. Each finished job is returned exactly once.
    pub fn take_finished(&mut self) -> Vec<Job> {
        let (done, live): (Vec<Job>, Vec<Job>) = std::mem::take(&mut self.jobs)
            .into_iter()
            .partition(|job| job.status == JobStatus::Done);
        self.jobs = live;

        if self.has_foreground() {
            self.deferred.extend(done);
            return Vec::new();
        }

        let mut finished = std::mem::take(&mut self.deferred);
        finished.extend(done);
        finished.sort_by_key(|job| job.id);
        finished
    }

    /// Number of reports held back by a foreground wait.
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    /// Every live job, foreground first: what must be signalled on exit.
    fn live_jobs(&self) -> impl Iterator<Item = &Job> {
        self.foreground
            .iter()
            .chain(self.jobs.iter())
            .filter(|job| job.status != JobStatus::Done)
    }
}

/// Shared handle to the job table plus the foreground wait.
pub struct JobManager {
    table: Mutex<JobTable>,
    state: watch::Receiver<ForegroundState>,
    terminal: Option<TerminalState>,
}

impl JobManager {
    /// Create a job manager that never touches the terminal.
    pub fn new() -> Self {
        Self::with_terminal(None)
    }

    /// Create a job manager that hands `terminal` to foreground jobs.
    pub fn with_terminal(terminal: Option<TerminalState>) -> Self {
        let table = JobTable::new();
        let state = table.subscribe();
        Self {
            table: Mutex::new(table),
            state,
            terminal,
        }
    }

    /// The terminal, if this shell does job control.
    pub fn terminal(&self) -> Option<&TerminalState> {
        self.terminal.as_ref()
    }

    /// Make the job group `pgid` the terminal's foreground group.
    ///
    /// Call with the table locked, so the group cannot be reaped first.
    /// A no-op without a terminal.
    pub fn give_terminal_to(&self, pgid: Pid) {
        if let Some(term) = &self.terminal
            && let Err(e) = term.give_to(pgid)
        {
            tracing::warn!(pgid = pgid.as_raw(), error = %e, "failed to give terminal to job");
        }
    }

    /// Give the terminal back to the shell. A no-op without a terminal.
    pub fn reclaim_terminal(&self) {
        if let Some(term) = &self.terminal
            && let Err(e) = term.reclaim()
        {
            tracing::warn!(error = %e, "failed to reclaim terminal");
        }
    }

    /// Lock the table.
    ///
    /// The reaper cannot collect any child while the guard is held, so a
    /// spawn and its registration done under one guard cannot race it.
    pub async fn lock(&self) -> MutexGuard<'_, JobTable> {
        self.table.lock().await
    }

    /// Block until `pid` leaves the foreground slot.
    ///
    /// The current state is checked first, so an exit that the reaper
    /// recorded before this call is still seen. No timeout. The terminal,
    /// if any, is back with the shell when this returns.
    #[tracing::instrument(level = "debug", skip(self, pid), fields(pid = pid.as_raw()))]
    pub async fn wait_foreground(&self, pid: Pid) -> Option<ForegroundOutcome> {
        let mut state = self.state.clone();
        let settled = state
            .wait_for(|s| !matches!(s, ForegroundState::Waiting(p) if *p == pid))
            .await
            .map(|s| s.clone());
        self.reclaim_terminal();
        match settled.ok()? {
            ForegroundState::Finished(p, outcome) if p == pid => Some(outcome),
            other => {
                tracing::warn!(?other, "foreground wait ended without an outcome");
                None
            }
        }
    }

    /// Collect every pending state change of every tracked child.
    ///
    /// Each tracked pid is waited on individually with `WNOHANG`, repeating
    /// until it reports no further change, so one SIGCHLD covering several
    /// children loses nothing and children that are not ours are left alone.
    pub async fn reap(&self) -> Vec<Transition> {
        let mut table = self.table.lock().await;
        let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
        let mut transitions = Vec::new();

        for pid in table.tracked_pids() {
            loop {
                match waitpid(pid, Some(flags)) {
                    Ok(WaitStatus::StillAlive) => break,
                    Ok(status) => {
                        let ended = matches!(status, WaitStatus::Exited(..) | WaitStatus::Signaled(..));
                        let transition = table.apply(status);
                        tracing::debug!(pid = pid.as_raw(), ?status, ?transition, "reaped");
                        transitions.push(transition);
                        if ended {
                            break;
                        }
                    }
                    Err(Errno::EINTR) => continue,
                    Err(Errno::ECHILD) => {
                        // Someone else collected it; it is gone either way
                        tracing::warn!(pid = pid.as_raw(), "tracked child already reaped");
                        transitions.push(table.apply(WaitStatus::Exited(pid, 0)));
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(pid = pid.as_raw(), error = %e, "waitpid failed");
                        break;
                    }
                }
            }
        }

        transitions
    }

    /// Remove finished jobs for reporting. See [`JobTable::take_finished`].
    pub async fn take_finished(&self) -> Vec<JobInfo> {
        let mut table = self.table.lock().await;
        table.take_finished().iter().filter_map(Job::info).collect()
    }

    /// List registry jobs, oldest first.
    pub async fn list(&self) -> Vec<JobInfo> {
        self.table.lock().await.list()
    }

    /// Pid of the current foreground job, if any.
    pub async fn foreground_pid(&self) -> Option<Pid> {
        self.table.lock().await.foreground_pid()
    }

    /// Interrupt every live job before the shell exits.
    ///
    /// Stopped jobs also get SIGCONT, otherwise the interrupt would stay
    /// pending until someone resumed them.
    pub async fn shutdown(&self) {
        let table = self.table.lock().await;
        for job in table.live_jobs() {
            if let Err(e) = killpg(job.pid, Signal::SIGINT) {
                tracing::warn!(pid = job.pid.as_raw(), error = %e, "failed to interrupt job");
                continue;
            }
            if job.status == JobStatus::Stopped
                && let Err(e) = killpg(job.pid, Signal::SIGCONT)
            {
                tracing::warn!(pid = job.pid.as_raw(), error = %e, "failed to continue stopped job");
            }
        }
    }
}

impl Default for JobManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: i32) -> Pid {
        Pid::from_raw(n)
    }

    #[test]
    fn job_numbers_increase_and_are_never_reused() {
        let mut table = JobTable::new();
        let a = table.push_background(pid(100), "a");
        let b = table.push_background(pid(101), "b");
        assert_eq!((a, b), (JobId(1), JobId(2)));

        table.apply(WaitStatus::Exited(pid(101), 0));
        assert_eq!(table.take_finished().len(), 1);

        let c = table.push_background(pid(102), "c");
        assert_eq!(c, JobId(3));
        assert!(table.take(a).is_some());
        let d = table.push_background(pid(103), "d");
        assert_eq!(d, JobId(4));
    }

    #[test]
    fn exit_marks_done_without_removing() {
        let mut table = JobTable::new();
        let id = table.push_background(pid(200), "sleep 1 &");

        let transition = table.apply(WaitStatus::Exited(pid(200), 0));
        assert_eq!(transition, Transition::Updated(id, JobStatus::Done));
        assert_eq!(table.len(), 1);
        assert_eq!(table.list()[0].status, JobStatus::Done);
        // A finished job is no longer waited on
        assert!(table.tracked_pids().is_empty());
    }

    #[test]
    fn unknown_pid_is_ignored() {
        let mut table = JobTable::new();
        table.push_background(pid(300), "x");
        assert_eq!(table.apply(WaitStatus::Exited(pid(999), 1)), Transition::Ignored);
        assert_eq!(table.list()[0].status, JobStatus::Running);
    }

    #[test]
    fn foreground_exit_releases_slot_and_publishes_outcome() {
        let mut table = JobTable::new();
        let rx = table.subscribe();
        table.set_foreground(pid(400), "make", None);
        assert_eq!(*rx.borrow(), ForegroundState::Waiting(pid(400)));

        let transition = table.apply(WaitStatus::Exited(pid(400), 2));
        assert_eq!(transition, Transition::ForegroundDone(pid(400)));
        assert!(!table.has_foreground());
        assert!(table.is_empty());
        assert_eq!(
            *rx.borrow(),
            ForegroundState::Finished(pid(400), ForegroundOutcome::Exited(2))
        );
    }

    #[test]
    fn foreground_stop_moves_job_into_registry() {
        let mut table = JobTable::new();
        table.push_background(pid(500), "first &");
        table.set_foreground(pid(501), "vim notes", None);

        let transition = table.apply(WaitStatus::Stopped(pid(501), Signal::SIGTSTP));
        let Transition::ForegroundStopped(info) = transition else {
            panic!("expected a stop transition, got {transition:?}");
        };
        assert_eq!(info.id, JobId(2));
        assert_eq!(info.status, JobStatus::Stopped);
        assert!(!table.has_foreground());
        let pids: Vec<u32> = table.list().iter().map(|j| j.pid).collect();
        assert_eq!(pids, vec![500, 501]);
    }

    #[test]
    fn fg_then_stop_keeps_the_job_number() {
        let mut table = JobTable::new();
        let id = table.push_background(pid(600), "sleep 50 &");
        table.push_background(pid(601), "sleep 60 &");

        let fg_pid = table.foreground_from_registry(id);
        assert_eq!(fg_pid, Some(pid(600)));
        // pid is in exactly one place
        assert!(table.list().iter().all(|j| j.pid != 600));
        assert_eq!(table.foreground_pid(), Some(pid(600)));

        let info = table.stop_foreground().unwrap();
        assert_eq!(info.id, id);
        assert_eq!(info.command, "sleep 50 &");
    }

    #[test]
    fn continued_sets_running_again() {
        let mut table = JobTable::new();
        let id = table.push_background(pid(700), "job");
        table.apply(WaitStatus::Stopped(pid(700), Signal::SIGSTOP));
        assert_eq!(table.list()[0].status, JobStatus::Stopped);
        assert_eq!(
            table.apply(WaitStatus::Continued(pid(700))),
            Transition::Updated(id, JobStatus::Running)
        );
    }

    #[test]
    fn select_defaults_to_most_recent_live_job() {
        let mut table = JobTable::new();
        table.push_background(pid(800), "one");
        let two = table.push_background(pid(801), "two");
        table.push_background(pid(802), "three");
        table.apply(WaitStatus::Exited(pid(802), 0));

        assert_eq!(table.select(None).and_then(|j| j.id), Some(two));
        assert!(table.select(Some(JobId(3))).is_none());
        assert!(table.select(Some(JobId(42))).is_none());
        assert!(JobTable::new().select(None).is_none());
    }

    #[test]
    fn reports_are_deferred_during_a_foreground_wait() {
        let mut table = JobTable::new();
        table.push_background(pid(900), "bg one");
        table.set_foreground(pid(901), "fg", None);
        table.apply(WaitStatus::Exited(pid(900), 0));

        assert!(table.take_finished().is_empty());
        assert_eq!(table.deferred_len(), 1);
        assert!(table.is_empty());

        table.apply(WaitStatus::Exited(pid(901), 0));
        let finished = table.take_finished();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].command, "bg one");
        // Exactly once
        assert!(table.take_finished().is_empty());
    }

    #[test]
    fn finished_reports_come_oldest_first() {
        let mut table = JobTable::new();
        table.push_background(pid(1000), "a");
        table.push_background(pid(1001), "b");
        table.push_background(pid(1002), "c");
        table.apply(WaitStatus::Exited(pid(1002), 0));
        table.apply(WaitStatus::Exited(pid(1000), 0));

        let names: Vec<String> = table.take_finished().into_iter().map(|j| j.command).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn wait_sees_an_outcome_recorded_before_it_started() {
        let manager = JobManager::new();
        {
            let mut table = manager.lock().await;
            table.set_foreground(pid(1100), "true", None);
            table.apply(WaitStatus::Exited(pid(1100), 0));
        }
        let outcome = manager.wait_foreground(pid(1100)).await;
        assert_eq!(outcome, Some(ForegroundOutcome::Exited(0)));
    }

    #[tokio::test]
    async fn shutdown_continues_stopped_jobs_after_interrupting() {
        use std::os::unix::process::{CommandExt, ExitStatusExt};

        let mut child = std::process::Command::new("sleep")
            .arg("30")
            .process_group(0)
            .spawn()
            .unwrap();
        let child_pid = pid(child.id() as i32);
        killpg(child_pid, Signal::SIGSTOP).unwrap();

        let manager = JobManager::new();
        {
            let mut table = manager.lock().await;
            table.push_background(child_pid, "sleep 30 &");
            table.apply(WaitStatus::Stopped(child_pid, Signal::SIGSTOP));
            assert_eq!(table.list()[0].status, JobStatus::Stopped);
        }
        manager.shutdown().await;

        let status = child.wait().unwrap();
        assert_eq!(status.signal(), Some(Signal::SIGINT as i32));
    }

    #[tokio::test]
    async fn shutdown_tolerates_jobs_that_are_already_gone() {
        let manager = JobManager::new();
        {
            let mut table = manager.lock().await;
            table.push_background(pid(i32::MAX - 7), "gone &");
            table.apply(WaitStatus::Stopped(pid(i32::MAX - 7), Signal::SIGTSTP));
        }
        manager.shutdown().await;
        assert_eq!(manager.list().await.len(), 1);
    }

    #[test]
    fn outcome_exit_codes() {
        assert_eq!(ForegroundOutcome::Exited(3).exit_code(), 3);
        assert_eq!(ForegroundOutcome::Signaled(Signal::SIGINT).exit_code(), 130);
        let info = JobInfo {
            id: JobId(1),
            command: "x".into(),
            status: JobStatus::Stopped,
            pid: 1,
        };
        assert_eq!(ForegroundOutcome::Stopped(info).exit_code(), 148);
    }
}
