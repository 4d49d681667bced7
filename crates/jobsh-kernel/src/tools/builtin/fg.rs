//! fg: bring a job to the foreground.

use async_trait::async_trait;
use nix::sys::signal::{Signal, killpg};

use jobsh_types::{ExecResult, JobStatus};

use crate::error::ShellError;
use crate::spawn::foreground_result;
use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};

/// Fg tool: move a registry job into the foreground slot and wait on it.
pub struct Fg;

#[async_trait]
impl Tool for Fg {
    fn name(&self) -> &str {
        "fg"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("fg", "Resume a job in the foreground")
            .param(ParamSchema::optional(
                "job",
                "int",
                "Job number, plain or %N (defaults to the most recent job)",
            ))
            .example("Resume the most recent job", "fg")
            .example("Resume a specific job", "fg %2")
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let requested = match args.job_id("fg") {
            Ok(id) => id,
            Err(result) => return result,
        };

        // Selection, continue and the move into the slot happen under one
        // lock, so the reaper sees the job either in the registry or in the
        // foreground, never in neither
        let (pid, command) = {
            let mut table = ctx.jobs.lock().await;
            let Some((id, pid, status)) = table.select(requested).and_then(|job| Some((job.id?, job.pid, job.status)))
            else {
                drop(table);
                return ctx.no_such_job("fg", requested);
            };

            // The group must own the terminal before it runs again
            ctx.jobs.give_terminal_to(pid);
            if status == JobStatus::Stopped
                && let Err(e) = killpg(pid, Signal::SIGCONT)
            {
                ctx.jobs.reclaim_terminal();
                return ExecResult::failure(1, format!("fg: {}", ShellError::Signal(e)));
            }
            let command = table.get_mut(id).map(|job| job.command.clone()).unwrap_or_default();
            let Some(pid) = table.foreground_from_registry(id) else {
                ctx.jobs.reclaim_terminal();
                return ExecResult::default();
            };
            tracing::debug!(job = %id, pid = pid.as_raw(), "moved to foreground");
            (pid, command)
        };

        let mut result = foreground_result(ctx.jobs.wait_foreground(pid).await);
        result.out.insert_str(0, &format!("{}\n", command));
        result
    }
}
