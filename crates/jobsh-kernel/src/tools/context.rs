//! Execution context for tools.

use std::path::PathBuf;
use std::sync::Arc;

use jobsh_types::{ExecResult, JobId};

use crate::config::ShellConfig;
use crate::error::ShellError;
use crate::scheduler::JobManager;

/// Execution context passed to tools.
///
/// Lives for the whole session inside the [`Shell`](crate::Shell); state a
/// builtin must remember between calls (the previous directory for
/// `cd -`) is kept here.
pub struct ExecContext {
    /// The shared job registry.
    pub jobs: Arc<JobManager>,
    /// Whether `fg`/`bg` report an unknown job number.
    pub report_unknown_jobs: bool,
    /// Home override for `cd` with no argument.
    pub home: Option<PathBuf>,
    /// Previous working directory (for `cd -`).
    pub prev_cwd: Option<PathBuf>,
}

impl ExecContext {
    /// Create a context over a job manager.
    pub fn new(jobs: Arc<JobManager>, config: &ShellConfig) -> Self {
        Self {
            jobs,
            report_unknown_jobs: config.report_unknown_jobs,
            home: config.home.clone(),
            prev_cwd: None,
        }
    }

    /// Result for `fg`/`bg` when no job matched.
    ///
    /// Silent success unless unknown jobs are reported. Nothing is
    /// reported for an empty selection (no argument, nothing to resume).
    pub fn no_such_job(&self, tool: &str, requested: Option<JobId>) -> ExecResult {
        match requested {
            Some(id) if self.report_unknown_jobs => {
                ExecResult::failure(1, format!("{}: {}", tool, ShellError::NoSuchJob(id)))
            }
            _ => ExecResult::default(),
        }
    }
}
