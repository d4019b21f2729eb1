//! Governance directives issued by the privileged agent, and procedure
//! recording from ordinary agents.
//!
//! Both feed append-only documents that later runs read back as context.

pub mod context;

pub use context::GovernanceContext;

use serde::{Deserialize, Serialize};

/// Header written when the governance log is created.
pub const GOVERNANCE_LOG_HEADER: &str =
    "# Governance Log\n\nDecisions and directives issued by the Guild Master.\n";

/// Directives found in one privileged-agent output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceDirectives {
    pub class_changes: Vec<String>,
    pub guild_policies: Vec<String>,
}

impl GovernanceDirectives {
    /// Lines starting with `CLASS-CHANGE:` or `GUILD-POLICY:`.
    pub fn extract(output: &str) -> Self {
        let mut directives = Self::default();
        for line in output.lines().map(str::trim) {
            if line.starts_with("CLASS-CHANGE:") {
                directives.class_changes.push(line.to_string());
            } else if line.starts_with("GUILD-POLICY:") {
                directives.guild_policies.push(line.to_string());
            }
        }
        directives
    }

    pub fn is_empty(&self) -> bool {
        self.class_changes.is_empty() && self.guild_policies.is_empty()
    }

    /// Dated assessment entry for the governance log, `None` when empty.
    pub fn log_entry(&self, run_id: &str, date: &str) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut lines = vec![format!("\n## Assessment: {run_id} ({date})\n")];
        for (title, items) in [
            ("Class Change Directives", &self.class_changes),
            ("Guild Policy Directives", &self.guild_policies),
        ] {
            if items.is_empty() {
                continue;
            }
            lines.push(format!("### {title}"));
            lines.push("| # | Directive | Status |".to_string());
            lines.push("|---|---|---|".to_string());
            for (i, item) in items.iter().enumerate() {
                lines.push(format!("| {} | {} | LOGGED |", i + 1, item.replace('|', "\\|")));
            }
            lines.push(String::new());
        }
        Some(lines.join("\n"))
    }

    /// Policy block appended to the procedures document, `None` when there
    /// are no policy directives.
    pub fn procedures_entry(&self, run_id: &str, date: &str) -> Option<String> {
        if self.guild_policies.is_empty() {
            return None;
        }
        let mut text = format!("\n### Guild Master Policy ({date}, {run_id})\n");
        for policy in &self.guild_policies {
            text.push_str(&format!("- {policy}\n"));
        }
        Some(text)
    }

    pub fn summary(&self) -> String {
        if self.is_empty() {
            "No governance actions to apply.".to_string()
        } else {
            format!(
                "Governance log updated: {} class-change(s), {} guild-policy(ies) recorded.",
                self.class_changes.len(),
                self.guild_policies.len()
            )
        }
    }
}

/// Procedures document entry for a newly recorded procedure.
pub fn procedure_entry(agent: &str, date: &str, task_id: &str, procedure: &str) -> String {
    format!("\n### From {agent} ({date}, {task_id})\n{procedure}\n")
}
