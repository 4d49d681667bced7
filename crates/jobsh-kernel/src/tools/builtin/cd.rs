//! cd: change the shell's working directory.

use std::path::PathBuf;

use async_trait::async_trait;

use jobsh_types::ExecResult;

use crate::error::ShellError;
use crate::paths;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};

/// Cd tool: change the working directory of the shell process.
///
/// Children inherit it, so the next spawned job starts there.
pub struct Cd;

#[async_trait]
impl Tool for Cd {
    fn name(&self) -> &str {
        "cd"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("cd", "Change current working directory")
            .param(ParamSchema::optional(
                "path",
                "string",
                "Directory to change to (home if omitted, - for the previous directory)",
            ))
            .example("Go home", "cd")
            .example("Go back", "cd -")
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let path_arg = args.get_positional(0);

        let target: PathBuf = match path_arg {
            Some("-") => match &ctx.prev_cwd {
                Some(prev) => prev.clone(),
                None => return ExecResult::failure(1, "cd: OLDPWD not set"),
            },
            Some(path) => PathBuf::from(path),
            None => match ctx.home.clone().or_else(paths::home_var) {
                Some(home) => home,
                None => return ExecResult::failure(1, "cd: HOME not set"),
            },
        };

        let previous = std::env::current_dir().ok();
        if let Err(source) = std::env::set_current_dir(&target) {
            return ShellError::InvalidDirectory { path: target, source }.into_result();
        }
        tracing::debug!(cwd = %target.display(), "changed directory");
        ctx.prev_cwd = previous;

        // Like bash, `cd -` prints where it went
        if path_arg == Some("-") {
            ExecResult::success(format!("{}\n", target.display()))
        } else {
            ExecResult::success("")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShellConfig;
    use crate::scheduler::JobManager;
    use std::sync::Arc;

    fn make_ctx() -> ExecContext {
        ExecContext::new(Arc::new(JobManager::new()), &ShellConfig::transient())
    }

    #[tokio::test]
    async fn test_cd_nonexistent() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let before = std::env::current_dir().unwrap();

        let mut ctx = make_ctx();
        let mut args = ToolArgs::new();
        args.positional.push(missing.to_string_lossy().into_owned());
        let result = Cd.execute(args, &mut ctx).await;

        assert_eq!(result.code, 1);
        assert!(result.err.starts_with("cd: "));
        assert!(result.err.contains("nope"));
        assert_eq!(std::env::current_dir().unwrap(), before);
        assert!(ctx.prev_cwd.is_none());
    }

    #[tokio::test]
    async fn test_cd_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, b"data").unwrap();

        let mut ctx = make_ctx();
        let mut args = ToolArgs::new();
        args.positional.push(file.to_string_lossy().into_owned());
        let result = Cd.execute(args, &mut ctx).await;
        assert!(!result.ok());
    }

    #[tokio::test]
    async fn test_cd_dash_without_history() {
        let mut ctx = make_ctx();
        let mut args = ToolArgs::new();
        args.positional.push("-".into());
        let result = Cd.execute(args, &mut ctx).await;
        assert_eq!(result.err, "cd: OLDPWD not set");
    }
}
