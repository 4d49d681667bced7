//! jobs: list background and stopped jobs.

use async_trait::async_trait;

use jobsh_types::ExecResult;

use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};

/// Jobs tool: list the job registry, oldest first.
pub struct Jobs;

#[async_trait]
impl Tool for Jobs {
    fn name(&self) -> &str {
        "jobs"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("jobs", "List background and stopped jobs")
            .param(ParamSchema::optional("l", "bool", "Include process ids (-l)"))
            .example("List jobs", "jobs")
            .example("List jobs with their pids", "jobs -l")
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        let long = args.has_flag("l");
        let mut out = String::new();
        for job in ctx.jobs.list().await {
            if long {
                out.push_str(&format!("[{}]  {:<7} {:<10} {}\n", job.id, job.pid, job.status, job.command));
            } else {
                out.push_str(&format!("{}\n", job));
            }
        }
        ExecResult::success(out)
    }
}
