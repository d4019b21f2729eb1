//! Human-readable run report and the detailed full-output log.

use guildhall_application::{AutorunReport, PatchArtifact};
use guildhall_domain::{AgentOutcome, AgentOutputRecord};

/// One-line pipeline status.
pub fn pipeline_status(report: &AutorunReport) -> String {
    match report.run.halt_reason() {
        Some(reason) => format!("HALTED: {reason}"),
        None => "completed".to_string(),
    }
}

fn task_command_label(report: &AutorunReport) -> String {
    match &report.task_command {
        Some(cmd) => cmd.clone(),
        None => format!("(task source: {})", report.task_source.as_str()),
    }
}

fn macro_label(report: &AutorunReport) -> String {
    match (&report.preset.name, &report.unknown_macro) {
        (Some(name), _) => name.clone(),
        (None, Some(requested)) => format!("none (unknown macro '{requested}')"),
        (None, None) => "none".to_string(),
    }
}

fn header(report: &AutorunReport) -> Vec<String> {
    vec![
        format!("# Guildhall Run {}", report.run_id()),
        String::new(),
        format!("- Task: {}", report.task.id),
        format!("- Macro mode: {}", macro_label(report)),
        format!("- Task command: {}", task_command_label(report)),
        format!("- Task mode: {}", report.task_mode),
        format!("- Agent mode: {}", report.selection.mode),
        format!(
            "- Auto apply patch: {}",
            if report.auto_apply { "enabled" } else { "disabled" }
        ),
        format!("- Pipeline status: {}", pipeline_status(report)),
        format!("- Sequence: {}", report.selection.names().join(" -> ")),
        format!("- Scope: {} files", report.scope.len()),
        String::new(),
    ]
}

fn gate_line(record: &AgentOutputRecord) -> String {
    let mut line = format!("_Gate: {} ({})", record.gate.verdict, record.gate.message);
    if record.cache_hit {
        line.push_str(", cached");
    }
    if record.truncated {
        line.push_str(", truncated");
    }
    line.push('_');
    line
}

fn patch_lines(report: &AutorunReport) -> Vec<String> {
    let patch = &report.patch;
    let mut lines = vec!["## Patch".to_string(), String::new()];
    lines.push(format!("- Status: {}", patch.artifact.status()));
    match &patch.artifact {
        PatchArtifact::Produced { source, files, .. } => {
            lines.push(format!("- Source: {source}"));
            lines.push(format!("- Files: {}", files.join(", ")));
        }
        PatchArtifact::Rejected { reason } | PatchArtifact::Empty { reason } => {
            lines.push(format!("- Reason: {reason}"));
        }
        PatchArtifact::NotRequested | PatchArtifact::SkippedAfterHalt => {}
    }
    if patch.blocks_parsed > 0 {
        lines.push(format!(
            "- Edit blocks: {}/{} applied",
            patch.blocks_applied, patch.blocks_parsed
        ));
    }
    for error in &patch.block_errors {
        lines.push(format!("  - {error}"));
    }
    lines.push(format!(
        "- Apply: {} ({})",
        report.apply.as_str(),
        report.apply.message()
    ));
    lines.push(String::new());
    lines
}

/// Bullet list of next-run recommendations, or `None` when there are none.
pub fn recommendations(report: &AutorunReport) -> Option<String> {
    let recs = report.run.next_run_recommendations();
    if recs.is_empty() {
        return None;
    }
    Some(
        recs.iter()
            .map(|(agent, rec)| format!("- **{agent}**: {rec}"))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// `runs/<run_id>.md`
pub fn render_report(report: &AutorunReport) -> String {
    let mut lines = header(report);

    for outcome in report.run.outcomes() {
        lines.push(format!("## {}", outcome.agent()));
        match outcome {
            AgentOutcome::Completed(record) => {
                lines.push(gate_line(record));
                if !record.gate.invalid_file_refs.is_empty() {
                    lines.push(format!(
                        "_Unknown file references: {}_",
                        record.gate.invalid_file_refs.join(", ")
                    ));
                }
                lines.push(String::new());
                lines.push(record.public_text().trim().to_string());
            }
            AgentOutcome::Skipped { reason, .. } => {
                lines.push(format!("*Skipped: {reason}*"));
            }
        }
        lines.push(String::new());
    }

    if let Some(review) = &report.review {
        lines.push("## Guild Review".to_string());
        lines.push(String::new());
        lines.push(format!("- Verdict: {}", review.verdict));
        lines.push(format!("- Summary: {}", review.summary));
        if !review.suspect_apis.is_empty() {
            lines.push(format!("- Suspect APIs: {}", review.suspect_apis.join(", ")));
        }
        lines.push(String::new());
    }

    lines.extend(patch_lines(report));

    if let Some(governance) = &report.governance
        && !governance.is_empty()
    {
        lines.push("## Governance Directives".to_string());
        lines.push(String::new());
        lines.extend(
            governance
                .class_changes
                .iter()
                .chain(&governance.guild_policies)
                .map(|d| format!("- {d}")),
        );
        lines.push(String::new());
    }

    if !report.procedures_recorded.is_empty() {
        lines.push("## Procedures Recorded".to_string());
        lines.push(String::new());
        lines.extend(report.procedures_recorded.iter().map(|a| format!("- {a}")));
        lines.push(String::new());
    }

    if let Some(recs) = recommendations(report) {
        lines.push("## Recommended Next Run".to_string());
        lines.push(String::new());
        lines.push(recs);
        lines.push(String::new());
    }

    lines.push(report.dashboard.render_markdown());
    lines.join("\n").trim().to_string() + "\n"
}

/// `runs/<run_id>.full.md`: raw outputs including hidden reasoning.
pub fn render_full_log(report: &AutorunReport) -> String {
    let mut lines = vec![
        format!("# Guildhall Full Log {}", report.run_id()),
        String::new(),
        format!("- Task: {}", report.task.id),
        format!("- Pipeline status: {}", pipeline_status(report)),
        String::new(),
        "## Task".to_string(),
        String::new(),
        report.task.text.trim().to_string(),
        String::new(),
    ];

    for outcome in report.run.outcomes() {
        lines.push(format!("## {}", outcome.agent()));
        lines.push(String::new());
        match outcome {
            AgentOutcome::Completed(record) => {
                lines.push(format!("- Fingerprint: {}", record.fingerprint.as_str()));
                lines.push(format!("- Cache hit: {}", record.cache_hit));
                lines.push(format!("- Attempts: {}", record.attempts));
                lines.push(format!("- Latency: {}ms", record.latency_ms));
                lines.push(format!("- Prompt chars: {}", record.prompt_chars));
                lines.push(format!(
                    "- Gate: {} ({}), sections {}, confidence {}",
                    record.gate.verdict,
                    record.gate.message,
                    record.gate.sections_found,
                    record.gate.confidence
                ));
                let markers = &record.gate.markers;
                lines.push(format!(
                    "- Markers: concur {}, qualify {}, dissent {}",
                    markers.concur, markers.qualify, markers.dissent
                ));
                if record.split.has_reasoning() {
                    lines.push(String::new());
                    lines.push("### Reasoning".to_string());
                    lines.push(String::new());
                    lines.push(record.split.reasoning.trim().to_string());
                }
                lines.push(String::new());
                lines.push("### Output".to_string());
                lines.push(String::new());
                lines.push(record.raw.trim().to_string());
            }
            AgentOutcome::Skipped { reason, .. } => {
                lines.push(format!("*Skipped: {reason}*"));
            }
        }
        lines.push(String::new());
    }
    lines.join("\n").trim().to_string() + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures;
    use guildhall_domain::{GuildReview, ReviewVerdict};

    // ==================== Run Report Tests ====================

    #[test]
    fn test_report_header_and_sequence() {
        let text = render_report(&fixtures::report());
        assert!(text.starts_with("# Guildhall Run 2026-03-01-charge-102030\n"));
        assert!(text.contains("- Task: GEN-7"));
        assert!(text.contains("- Macro mode: charge"));
        assert!(text.contains("- Agent mode: macro:charge"));
        assert!(text.contains("- Pipeline status: completed"));
        assert!(text.contains("- Sequence: C++ Lead -> Vulkan Guru"));
        assert!(text.contains("- Status: produced"));
    }

    #[test]
    fn test_report_hides_reasoning() {
        let text = render_report(&fixtures::report());
        assert!(text.contains("Pool is uninitialised."));
        assert!(!text.contains("thinking about"));
    }

    #[test]
    fn test_report_halted_run() {
        let text = render_report(&fixtures::halted_report());
        assert!(text.contains("- Pipeline status: HALTED: C++ Lead: dissent ratio"));
        assert!(text.contains("*Skipped: C++ Lead: dissent ratio"));
    }

    #[test]
    fn test_report_recommendations_and_review() {
        let mut report = fixtures::report();
        report.review = Some(GuildReview {
            verdict: ReviewVerdict::Caution,
            summary: "One API unverified.".to_string(),
            suspect_apis: vec!["vkFooBar".to_string()],
            well_formed: true,
        });
        let text = render_report(&report);
        assert!(text.contains("## Recommended Next Run\n\n- **C++ Lead**: `Follow"));
        assert!(text.contains("- Verdict: CAUTION"));
        assert!(text.contains("- Suspect APIs: vkFooBar"));
        assert!(text.contains("No trailing metrics available yet."));
    }

    #[test]
    fn test_unknown_macro_is_labelled() {
        let mut report = fixtures::report();
        report.preset.name = None;
        report.unknown_macro = Some("chrage".to_string());
        assert!(render_report(&report).contains("- Macro mode: none (unknown macro 'chrage')"));
    }

    // ==================== Full Log Tests ====================

    #[test]
    fn test_full_log_includes_reasoning() {
        let text = render_full_log(&fixtures::report());
        assert!(text.contains("### Reasoning\n\nthinking about C++ Lead"));
        assert!(text.contains("- Cache hit: false"));
        assert!(text.contains("Initialise the pool."));
    }
}
