//! Error types for the execution core.

use std::io;
use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

use jobsh_types::{ExecResult, JobId};

/// Result type for shell operations.
pub type ShellResult<T> = Result<T, ShellError>;

/// Errors raised while launching commands or running builtins.
///
/// Only [`ShellError::SpawnFailure`] is fatal; everything else is reported
/// to the user and the interactive loop carries on.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The program could not be resolved to an executable file.
    #[error("{0}: command not found")]
    CommandNotFound(String),

    /// The OS refused to create a new process (out of processes or memory).
    #[error("cannot create process: {0}")]
    SpawnFailure(#[source] io::Error),

    /// The process could not run the resolved executable.
    #[error("{program}: {source}")]
    ExecFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    /// A redirection target could not be opened.
    #[error("{}: {source}", .path.display())]
    Redirect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `cd` target does not exist or is not accessible.
    #[error("cd: {}: {source}", .path.display())]
    InvalidDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `fg`/`bg` named a job that is not in the registry.
    #[error("%{0}: no such job")]
    NoSuchJob(JobId),

    /// Delivering a job-control signal failed.
    #[error("signal delivery failed: {0}")]
    Signal(#[from] Errno),

    /// Signal streams for the reaper or forwarders could not be installed.
    #[error("cannot install signal handlers: {0}")]
    SignalSetup(#[source] io::Error),
}

impl ShellError {
    /// Classify an error from `std::process::Command::spawn`.
    ///
    /// Resource exhaustion means no command can ever run again, so it maps
    /// to the fatal [`ShellError::SpawnFailure`]. Anything else (permission,
    /// bad executable format) only concerns this one command.
    pub fn from_spawn(program: &str, err: io::Error) -> Self {
        match err.raw_os_error().map(Errno::from_raw) {
            Some(Errno::EAGAIN) | Some(Errno::ENOMEM) => ShellError::SpawnFailure(err),
            _ if err.kind() == io::ErrorKind::OutOfMemory => ShellError::SpawnFailure(err),
            _ => ShellError::ExecFailed {
                program: program.to_string(),
                source: err,
            },
        }
    }

    /// True if the shell cannot safely continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::SpawnFailure(_))
    }

    /// Exit code reported for a non-fatal error.
    pub fn exit_code(&self) -> i64 {
        match self {
            ShellError::CommandNotFound(_) => 127,
            ShellError::ExecFailed { .. } => 126,
            _ => 1,
        }
    }

    /// Fold a non-fatal error into a result the REPL can print.
    pub fn into_result(self) -> ExecResult {
        ExecResult::failure(self.exit_code(), self.to_string())
    }
}
