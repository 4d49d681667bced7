//! jobsh-kernel: the execution core of jobsh.
//!
//! This crate provides:
//!
//! - **Scheduler**: the job registry, the SIGCHLD-driven reaper, the
//!   foreground wait and the SIGINT/SIGTSTP forwarders
//! - **Spawn**: executable resolution, redirection and process-group setup
//! - **Tools**: the `Tool` trait, registry, and the job-control builtins
//!   (`jobs`, `fg`, `bg`, `cd`)
//! - **Terminal**: handing the terminal to foreground jobs and back
//! - **Shell**: the facade the REPL drives, one command at a time
//! - **Paths**: XDG-compliant path helpers

pub mod config;
pub mod error;
pub mod paths;
pub mod resolve;
pub mod scheduler;
pub mod shell;
pub mod spawn;
pub mod terminal;
pub mod tools;

pub use config::ShellConfig;
pub use error::{ShellError, ShellResult};
pub use scheduler::{ForegroundOutcome, JobManager};
pub use shell::Shell;
pub use terminal::TerminalState;

// Data types shared with the parser side
pub use jobsh_types::{Command, ExecResult, JobId, JobInfo, JobStatus};
