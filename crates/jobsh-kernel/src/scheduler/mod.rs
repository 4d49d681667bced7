//! Scheduler module for jobsh: job registry, reaping and foreground waits.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         JobManager                           │
//! │  Mutex<JobTable>                                             │
//! │  ├── jobs: Vec<Job>          (background, oldest first)      │
//! │  ├── foreground: Option<Job> (while a wait is outstanding)   │
//! │  └── deferred: Vec<Job>      (reports held during a wait)    │
//! │  watch<ForegroundState>      (wakes the foreground wait)     │
//! └──────────────────────────────────────────────────────────────┘
//!        ▲ lock                 ▲ lock                 ▲ lock
//!   spawn + register       reaper task            fg / bg / jobs
//! ```

mod job;
mod signals;

pub use job::{
    ForegroundOutcome, ForegroundState, Job, JobId, JobInfo, JobManager, JobStatus, JobTable,
    Transition,
};
pub use signals::{forward_interrupt, forward_stop, spawn_forwarders, spawn_reaper};
