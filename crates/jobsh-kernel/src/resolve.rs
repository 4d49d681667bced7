//! Executable resolution: turn a program name into a path to run.

use std::path::{Path, PathBuf};

use nix::unistd::{AccessFlags, access};

/// Resolve `name` the way `execvp` would, but up front.
///
/// A name containing `/` is taken literally. Otherwise each `:`-separated
/// directory of `path_var` is tried in order and the first regular file the
/// current user may execute wins. Empty entries are skipped.
pub fn resolve_executable(name: &str, path_var: Option<&str>) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    if name.contains('/') {
        let path = PathBuf::from(name);
        return is_executable_file(&path).then_some(path);
    }

    path_var?
        .split(':')
        .filter(|dir| !dir.is_empty())
        .map(|dir| Path::new(dir).join(name))
        .find(|candidate| is_executable_file(candidate))
}

/// Resolve against the process's current `$PATH`.
pub fn resolve_in_env(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var("PATH").ok();
    resolve_executable(name, path_var.as_deref())
}

/// Regular file (after following symlinks) with execute permission for us.
fn is_executable_file(path: &Path) -> bool {
    match path.metadata() {
        Ok(meta) if meta.is_file() => access(path, AccessFlags::X_OK).is_ok(),
        _ => false,
    }
}
