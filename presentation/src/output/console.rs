//! Console output formatter for finished runs

use crate::artifacts::ArtifactPaths;
use crate::report::pipeline_status;
use colored::Colorize;
use guildhall_application::{ApplyStatus, AutorunReport};
use guildhall_domain::{AgentOutcome, GateVerdict};

/// Formats a run for terminal display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn format(report: &AutorunReport, paths: &ArtifactPaths) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!("Guildhall Run {}", report.run_id())));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Task:".cyan().bold(), report.task.id));
        output.push_str(&format!(
            "{} {}\n",
            "Macro:".cyan().bold(),
            report.preset.name.as_deref().unwrap_or("none")
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Agents:".cyan().bold(),
            report.selection.mode
        ));

        output.push_str(&Self::section_header("Agents"));
        for outcome in report.run.outcomes() {
            output.push_str(&Self::agent_line(outcome));
            output.push('\n');
        }

        if let Some(review) = &report.review {
            output.push_str(&Self::section_header("Guild Review"));
            let verdict = review.verdict.to_string();
            let verdict = if review.blocks() {
                verdict.red().bold()
            } else {
                verdict.green().bold()
            };
            output.push_str(&format!("{} {}\n", verdict, review.summary));
        }

        output.push_str(&Self::section_header("Result"));
        let status = pipeline_status(report);
        let status = if report.run.is_halted() {
            status.red().bold()
        } else {
            status.green().bold()
        };
        output.push_str(&format!("{} {}\n", "Pipeline:".bold(), status));
        output.push_str(&format!(
            "{} {}\n",
            "Patch:".bold(),
            report.patch.artifact.status()
        ));
        let apply = match &report.apply {
            ApplyStatus::Applied { .. } => report.apply.message().green(),
            ApplyStatus::Rejected { .. } => report.apply.message().red(),
            _ => report.apply.message().dimmed(),
        };
        output.push_str(&format!("{} {}\n", "Apply:".bold(), apply));

        output.push_str(&Self::section_header("Artifacts"));
        output.push_str(&format!("  {}\n", paths.run_report));
        output.push_str(&format!("  {}\n", paths.code_proposal));
        output.push_str(&format!("  {}\n", paths.patch_proposal));
        if let Some(guard) = &paths.guard_log {
            output.push_str(&format!("  {}\n", guard));
        }
        if let Some(next) = &paths.next_task {
            output.push_str(&format!("  {}\n", next));
        }

        output.push_str(&Self::footer());
        output
    }

    fn agent_line(outcome: &AgentOutcome) -> String {
        match outcome {
            AgentOutcome::Completed(record) => {
                let verdict = record.verdict().as_str();
                let verdict = match record.verdict() {
                    GateVerdict::Pass => verdict.green(),
                    GateVerdict::Retry | GateVerdict::Warn => verdict.yellow(),
                    GateVerdict::Halt => verdict.red().bold(),
                };
                let cached = if record.cache_hit {
                    " (cached)".dimmed().to_string()
                } else {
                    String::new()
                };
                format!("  {:<6} {}{}", verdict, record.agent, cached)
            }
            AgentOutcome::Skipped { agent, .. } => {
                format!("  {:<6} {}", "SKIP".dimmed(), agent.dimmed())
            }
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
