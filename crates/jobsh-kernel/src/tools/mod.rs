//! Tool system for jobsh.
//!
//! Builtins are tools: each implements the [`Tool`] trait and is looked up
//! by name in a [`ToolRegistry`] before the shell falls back to spawning an
//! external program.
//!
//! # Architecture
//!
//! ```text
//! ToolRegistry
//! └── Builtins (jobs, fg, bg, cd)
//! ```

mod builtin;
mod context;
mod registry;
mod traits;

pub use builtin::register_builtins;
pub use context::ExecContext;
pub use registry::ToolRegistry;
pub use traits::{ParamSchema, Tool, ToolArgs, ToolSchema};
