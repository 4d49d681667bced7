//! bg: resume a stopped job in the background.

use async_trait::async_trait;
use nix::sys::signal::{Signal, killpg};

use jobsh_types::{ExecResult, JobStatus};

use crate::error::ShellError;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};

/// Bg tool: continue a job without making it the foreground job.
pub struct Bg;

#[async_trait]
impl Tool for Bg {
    fn name(&self) -> &str {
        "bg"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("bg", "Resume a stopped job in the background")
            .param(ParamSchema::optional(
                "job",
                "int",
                "Job number, plain or %N (defaults to the most recent job)",
            ))
            .example("Resume the most recent job", "bg")
            .example("Resume a specific job", "bg %2")
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let requested = match args.job_id("bg") {
            Ok(id) => id,
            Err(result) => return result,
        };

        let mut table = ctx.jobs.lock().await;
        let Some((id, pid)) = table.select(requested).and_then(|job| Some((job.id?, job.pid))) else {
            drop(table);
            return ctx.no_such_job("bg", requested);
        };

        if let Err(e) = killpg(pid, Signal::SIGCONT) {
            return ExecResult::failure(1, format!("bg: {}", ShellError::Signal(e)));
        }
        let Some(job) = table.get_mut(id) else {
            return ExecResult::default();
        };
        job.status = JobStatus::Running;
        tracing::debug!(job = %id, pid = pid.as_raw(), "continued in background");
        ExecResult::success(format!("[{}] {}\n", id, job.command))
    }
}
