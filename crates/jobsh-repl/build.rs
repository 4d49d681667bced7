//! Build script for jobsh-repl.
//!
//! Stamps `--version` output with the git revision and the build date.

use std::process::Command;

fn main() {
    // No .git in packaged builds
    if std::path::Path::new("../../.git").exists() {
        println!("cargo::rerun-if-changed=../../.git/HEAD");
        println!("cargo::rerun-if-changed=../../.git/refs/heads/");
    }

    let git_hash = Command::new("git")
        .args(["describe", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let build_date = chrono::Utc::now().format("%Y-%m-%d").to_string();

    println!("cargo:rustc-env=JOBSH_GIT_HASH={git_hash}");
    println!("cargo:rustc-env=JOBSH_BUILD_DATE={build_date}");
}
