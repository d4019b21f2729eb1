//! Aggregated code proposal document.

use guildhall_application::AutorunReport;
use guildhall_domain::AgentOutcome;

/// `proposals/<date>-<task>-proposal.md`
///
/// Each agent contributes its `Code Proposal` section, or its whole public
/// output when it wrote none.
pub fn render_proposal(report: &AutorunReport) -> String {
    let mut lines = vec![
        format!("# Code Proposal: {} ({})", report.task.id, report.date()),
        String::new(),
        "This file aggregates proposed code changes from the automated agent run.".to_string(),
        String::new(),
    ];
    for outcome in report.run.outcomes() {
        lines.push(format!("## {}", outcome.agent()));
        match outcome {
            AgentOutcome::Completed(record) => {
                let body = record
                    .fields
                    .code_proposal
                    .as_deref()
                    .unwrap_or_else(|| record.public_text());
                lines.push(body.trim().to_string());
            }
            AgentOutcome::Skipped { reason, .. } => lines.push(format!("*Skipped: {reason}*")),
        }
        lines.push(String::new());
    }
    lines.join("\n").trim().to_string() + "\n"
}
