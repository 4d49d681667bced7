//! Job identification and status types.

/// Shell-visible job number, as printed by `jobs` and accepted by `fg`/`bg`.
///
/// Numbers are handed out in increasing order and never reused within a
/// session, so `%3` keeps naming the same job after `%1` and `%2` are gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = std::num::ParseIntError;

    /// Accepts both `3` and the `%3` job-spec form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('%').unwrap_or(s);
        digits.parse::<u64>().map(JobId)
    }
}

/// Status of a tracked job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Job is currently running.
    Running,
    /// Job was stopped by a signal (e.g., Ctrl-Z / SIGTSTP).
    Stopped,
    /// Job exited or was killed; waiting to be reported.
    Done,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `pad` so callers can align columns with `{:<10}`
        match self {
            JobStatus::Running => f.pad("Running"),
            JobStatus::Stopped => f.pad("Stopped"),
            JobStatus::Done => f.pad("Done"),
        }
    }
}

/// Information about a job for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInfo {
    /// Job number.
    pub id: JobId,
    /// Command line as the user typed it.
    pub command: String,
    /// Current status.
    pub status: JobStatus,
    /// OS process ID (also the process group ID).
    pub pid: u32,
}

impl std::fmt::Display for JobInfo {
    /// The one-line form shared by `jobs`, stop notices and completion notices.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]  {:<10} {}", self.id, self.status, self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_parses_plain_and_percent_forms() {
        assert_eq!("4".parse::<JobId>(), Ok(JobId(4)));
        assert_eq!("%12".parse::<JobId>(), Ok(JobId(12)));
        assert!("%".parse::<JobId>().is_err());
        assert!("abc".parse::<JobId>().is_err());
    }

    #[test]
    fn job_line_is_aligned() {
        let info = JobInfo {
            id: JobId(2),
            command: "sleep 30 &".to_string(),
            status: JobStatus::Stopped,
            pid: 4242,
        };
        assert_eq!(info.to_string(), "[2]  Stopped    sleep 30 &");
    }

    #[test]
    fn statuses_are_distinguishable() {
        let running = JobStatus::Running.to_string();
        let stopped = JobStatus::Stopped.to_string();
        let done = JobStatus::Done.to_string();
        assert_ne!(running, stopped);
        assert_ne!(stopped, done);
    }
}
