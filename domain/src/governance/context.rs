//! Context handed to the privileged agent in place of source code.

use crate::core::string::{prefix, suffix};
use crate::macros::QualityGateConfig;

const PROFILE_CHARS: usize = 1200;
const PROCEDURES_CHARS: usize = 3000;
const GOVERNANCE_TAIL_CHARS: usize = 3000;
const REPORT_CHARS: usize = 2000;

/// Everything the privileged agent observes. Collected by the caller.
#[derive(Debug, Clone, Default)]
pub struct GovernanceContext {
    /// Rendered dashboard over the observation window, if any records exist.
    pub metrics_dashboard: Option<String>,
    /// Most recent metric records, one JSON object per line.
    pub recent_records: Vec<String>,
    /// `(agent, persona document)`.
    pub profiles: Vec<(String, String)>,
    /// `(agent, guild documents)` for non-privileged agents.
    pub membership: Vec<(String, Vec<String>)>,
    /// `(guild, policy document)`.
    pub policies: Vec<(String, String)>,
    pub procedures: String,
    pub gate: QualityGateConfig,
    pub governance_log: Option<String>,
    /// `(file name, report)`, newest first.
    pub recent_reports: Vec<(String, String)>,
}

impl GovernanceContext {
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = vec![
            "# Guild Master Context".to_string(),
            String::new(),
            "You are the Guild Master, the ONLY agent with authority to observe and set guild policies.".to_string(),
            "You do NOT analyze source code. You govern the agent pipeline.".to_string(),
            "Issue directives as lines starting with `CLASS-CHANGE:` or `GUILD-POLICY:`.".to_string(),
            String::new(),
        ];

        match &self.metrics_dashboard {
            Some(dashboard) => {
                parts.push(dashboard.clone());
                parts.push(String::new());
                parts.push(format!("### Recent Metric Records (last {})", self.recent_records.len()));
                parts.push("```json".to_string());
                parts.extend(self.recent_records.iter().cloned());
                parts.push("```".to_string());
            }
            None => parts.push(
                "*No metrics data available yet. This is the first Guild Master run.*".to_string(),
            ),
        }
        parts.push(String::new());

        parts.push("## Current Class Profiles".to_string());
        for (name, profile) in &self.profiles {
            parts.push(format!("### {name}"));
            parts.push(prefix(profile, PROFILE_CHARS).to_string());
            parts.push(String::new());
        }

        parts.push("## Guild Membership Map".to_string());
        for (agent, guilds) in &self.membership {
            let listed = if guilds.is_empty() {
                "(no guild)".to_string()
            } else {
                guilds.join(", ")
            };
            parts.push(format!("- **{agent}** → {listed}"));
        }
        parts.push(String::new());

        parts.push("## Current Guild Policies".to_string());
        for (guild, policy) in &self.policies {
            parts.push(format!("### {guild}"));
            parts.push(policy.clone());
            parts.push(String::new());
        }

        if !self.procedures.trim().is_empty() {
            parts.push("## Current Procedures".to_string());
            parts.push(prefix(&self.procedures, PROCEDURES_CHARS).to_string());
        }
        parts.push(String::new());

        parts.push("## Current Quality Gate Config".to_string());
        parts.push(format!("- Dissent threshold: {}", self.gate.dissent_threshold));
        parts.push(format!("- Max output chars: {}", self.gate.max_output_chars));
        parts.push(format!("- Halt on low confidence: {}", self.gate.halt_on_low_confidence));
        parts.push(format!("- Validate file refs: {}", self.gate.validate_file_refs));
        parts.push(String::new());

        parts.push("## Previous Governance Decisions".to_string());
        match &self.governance_log {
            Some(log) => parts.push(suffix(log, GOVERNANCE_TAIL_CHARS).to_string()),
            None => parts.push(
                "*No governance log yet. This is the first Guild Master assessment.*".to_string(),
            ),
        }
        parts.push(String::new());

        if !self.recent_reports.is_empty() {
            parts.push(format!("## Recent Run Reports (last {})", self.recent_reports.len()));
            for (name, report) in &self.recent_reports {
                parts.push(format!("### {name}"));
                parts.push(prefix(report, REPORT_CHARS).to_string());
                parts.push(String::new());
            }
        }

        parts.join("\n")
    }
}
