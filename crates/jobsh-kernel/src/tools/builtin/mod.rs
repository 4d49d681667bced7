//! Built-in tools for jobsh.
//!
//! These run inside the shell process and never spawn a child.

mod bg;
mod cd;
mod fg;
mod jobs;

use super::ToolRegistry;

/// Register all built-in tools with the registry.
pub fn register_builtins(registry: &mut ToolRegistry) {
    registry.register(bg::Bg);
    registry.register(cd::Cd);
    registry.register(fg::Fg);
    registry.register(jobs::Jobs);
}
