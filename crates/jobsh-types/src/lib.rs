//! Pure data types for jobsh: jobs, parsed commands, execution results.
//!
//! This crate is a leaf dependency with no async runtime, no signals, no I/O.
//! The parser produces [`Command`] values from it and the kernel consumes
//! them, so neither side has to depend on the other.

pub mod command;
pub mod job;
pub mod result;

// Flat re-exports for convenience
pub use command::*;
pub use job::*;
pub use result::*;
