//! The `town/next-task.md` handoff to the next run.

use super::run_report::recommendations;
use guildhall_application::AutorunReport;

/// What to do with `town/next-task.md` after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextTask {
    /// Fresh recommendations.
    Recommend(String),
    /// Overwrite a stale file with a no-follow-up notice.
    Clear(String),
}

impl NextTask {
    pub fn content(&self) -> &str {
        match self {
            NextTask::Recommend(text) | NextTask::Clear(text) => text,
        }
    }
}

/// Recommendations are only carried forward from runs that did not halt.
pub fn render_next_task(report: &AutorunReport) -> NextTask {
    let run_id = report.run_id();
    let date = report.date();
    match recommendations(report) {
        Some(recs) if !report.run.is_halted() => NextTask::Recommend(format!(
            "# Recommended Next Run\n\n\
             Generated by agent run `{run_id}` on {date}.\n\n\
             ## Agent Recommendations\n\n\
             {recs}\n\n\
             ## How to Execute\n\n\
             Pick the recommendation you agree with and run:\n\n\
             ```sh\n\
             MACRO_MODE=<Macro> TASK_COMMAND=\"<command from above>\" guildhall\n\
             ```\n\n\
             Or pass `--macro <Macro> --task-command \"<command from above>\"` to the workflow step.\n"
        )),
        _ => NextTask::Clear(format!(
            "# Recommended Next Run\n\nNo follow-up recommended from run `{run_id}` ({date}).\n"
        )),
    }
}
