//! XDG Base Directory paths for jobsh.
//!
//! | Purpose | XDG Variable | Default |
//! |---------|--------------|---------|
//! | Data | `$XDG_DATA_HOME` | `~/.local/share` |

use std::path::PathBuf;

use directories::BaseDirs;

/// The value of `$HOME`, if it is set and non-empty.
///
/// `cd` with no argument uses this and fails when it is missing, the way
/// POSIX shells do.
pub fn home_var() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

/// Get the user's home directory.
///
/// Returns `$HOME` or falls back to `/tmp` if not set.
pub fn home_dir() -> PathBuf {
    home_var().unwrap_or_else(|| PathBuf::from("/tmp"))
}

/// Get XDG data home directory.
///
/// Returns `$XDG_DATA_HOME` or falls back to `~/.local/share`.
pub fn xdg_data_home() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| home_dir().join(".local").join("share"))
}

/// Get the jobsh data directory for persistent state.
pub fn data_dir() -> PathBuf {
    xdg_data_home().join("jobsh")
}

/// Where the REPL keeps its line history.
pub fn history_file() -> PathBuf {
    data_dir().join("history.txt")
}
