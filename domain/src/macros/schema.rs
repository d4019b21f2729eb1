//! Serde model of the macro schema document.
//!
//! Every field carries a default so a partial document (or none at all)
//! still produces a usable schema.

use super::preset::{ExecutionMode, MacroPreset, MacroResolution};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Default numbered output sections requested from every agent.
pub const DEFAULT_SECTIONS: [&str; 9] = [
    "1) Main Task Outcome",
    "2) Secondary Task Outcomes",
    "3) Risks and Constraints",
    "4) Actionable TODOs",
    "5) Handoff Note",
    "6) Code Proposal",
    "7) Cross-Confirmation",
    "8) Procedure Recording",
    "9) Recommended Next Run",
];

/// Backend retry schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_seconds: Vec<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_seconds: vec![2, 8, 30],
        }
    }
}

impl RetryPolicy {
    /// Wait before the next attempt after `attempt` (0-based) failed.
    ///
    /// Attempts beyond the schedule reuse its last entry.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let secs = match self.backoff_seconds.as_slice() {
            [] => 0,
            schedule => schedule[(attempt as usize).min(schedule.len() - 1)],
        };
        Duration::from_secs(secs)
    }

    /// At least one attempt is always made.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Structural validation thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub min_output_length: usize,
    pub required_section_count: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_output_length: 100,
            required_section_count: 4,
        }
    }
}

/// Semantic gate thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityGateConfig {
    pub dissent_threshold: f64,
    pub max_output_chars: usize,
    pub halt_on_low_confidence: bool,
    pub validate_file_refs: bool,
    /// File extensions considered source references by the grounding check.
    pub source_extensions: Vec<String>,
}

impl Default for QualityGateConfig {
    fn default() -> Self {
        Self {
            dissent_threshold: 0.5,
            max_output_chars: 4000,
            halt_on_low_confidence: true,
            validate_file_refs: true,
            source_extensions: ["cpp", "h", "hpp", "comp", "frag", "vert", "glsl", "tesc", "tese"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    /// Persona document, relative to the agents directory.
    pub profile: String,
    #[serde(default)]
    pub guilds: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// The lead decomposes its output into per-agent TODO blocks.
    #[serde(default)]
    pub lead: bool,
    /// The privileged agent governs the pipeline and never reads code.
    #[serde(default)]
    pub privileged: bool,
}

impl AgentSpec {
    pub fn new(name: impl Into<String>, profile: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            profile: profile.into(),
            guilds: Vec::new(),
            aliases: Vec::new(),
            lead: false,
            privileged: false,
        }
    }

    pub fn with_guilds(mut self, guilds: &[&str]) -> Self {
        self.guilds = guilds.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn as_lead(mut self) -> Self {
        self.lead = true;
        self
    }

    pub fn as_privileged(mut self) -> Self {
        self.privileged = true;
        self
    }
}

/// A named macro as written in the schema. Unset knobs fall back to the
/// base preset at resolution time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroDefinition {
    pub description: Option<String>,
    pub agents: Vec<String>,
    pub mode: ExecutionMode,
    pub temperature: Option<f32>,
    pub required_sections: Vec<String>,
    pub directives: BTreeMap<String, String>,
    pub handoff_chars: Option<usize>,
    pub context_chars: Option<usize>,
    pub cross_confirm: Option<bool>,
    pub max_output_chars: Option<usize>,
    pub produces_patch: Option<bool>,
    pub guild_review: Option<bool>,
    pub retry_on_gate_fail: Option<bool>,
}

/// The whole schema document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroSchema {
    pub retry: RetryPolicy,
    pub validation: ValidationRules,
    pub required_output_sections: Vec<String>,
    pub quality_gates: QualityGateConfig,
    pub macros: BTreeMap<String, MacroDefinition>,
    pub roster: Vec<AgentSpec>,
    /// Scope patterns used when a free-text task command replaces the task document.
    pub default_scope: Vec<String>,
}

impl Default for MacroSchema {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            validation: ValidationRules::default(),
            required_output_sections: Vec::new(),
            quality_gates: QualityGateConfig::default(),
            macros: BTreeMap::new(),
            roster: default_roster(),
            default_scope: vec!["src/**/*".to_string()],
        }
    }
}

fn default_roster() -> Vec<AgentSpec> {
    vec![
        AgentSpec::new("C++ Lead", "party/cpp-lead.md")
            .with_guilds(&["performance.md", "architecture.md"])
            .with_aliases(&["lead++", "cpp", "cpplead", "c++"])
            .as_lead(),
        AgentSpec::new("Vulkan Guru", "party/vulkan-guru.md")
            .with_guilds(&["performance.md", "gpu-pipeline.md"])
            .with_aliases(&["vulkan"]),
        AgentSpec::new("Kernel Expert", "party/kernel-expert.md")
            .with_guilds(&["performance.md", "gpu-pipeline.md"])
            .with_aliases(&["kernel"]),
        AgentSpec::new("Refactorer", "party/refactorer.md")
            .with_guilds(&["architecture.md"])
            .with_aliases(&["refactor"]),
        AgentSpec::new("HPC Marketeer", "party/hpc-marketeer.md").with_aliases(&["hpc"]),
        AgentSpec::new("Guild Master", "guilds/guild-master.md")
            .with_aliases(&["guild", "guildmaster", "master"])
            .as_privileged(),
    ]
}

impl MacroSchema {
    /// Case-insensitive macro lookup.
    pub fn find(&self, name: &str) -> Option<(&str, &MacroDefinition)> {
        let wanted = name.trim();
        self.macros
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(wanted))
            .map(|(key, def)| (key.as_str(), def))
    }

    /// The preset used when no macro is active.
    ///
    /// `context_chars` is the operator-configured code context budget.
    pub fn base_preset(&self, context_chars: usize) -> MacroPreset {
        MacroPreset {
            name: None,
            agents: Vec::new(),
            mode: ExecutionMode::Sequential,
            temperature: 0.2,
            required_sections: Vec::new(),
            directives: BTreeMap::new(),
            handoff_chars: 1500,
            context_chars,
            cross_confirm: true,
            max_output_chars: self.quality_gates.max_output_chars,
            produces_patch: true,
            guild_review: false,
            retry_on_gate_fail: true,
        }
    }

    /// Resolve an optional macro name into a preset.
    ///
    /// Unknown names fall back to the base preset; the caller decides how
    /// loudly to report that.
    pub fn resolve(&self, name: Option<&str>, context_chars: usize) -> MacroResolution {
        let base = self.base_preset(context_chars);
        let Some(requested) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            return MacroResolution::Default(base);
        };
        match self.find(requested) {
            Some((key, def)) => MacroResolution::Named(base.overlay(key, def)),
            None => MacroResolution::Unknown {
                requested: requested.to_string(),
                fallback: base,
            },
        }
    }

    /// Sections the gate counts for a given preset: the macro's own list,
    /// else the schema-wide list, else the default nine.
    pub fn gate_sections(&self, preset: &MacroPreset) -> Vec<String> {
        if !preset.required_sections.is_empty() {
            preset.required_sections.clone()
        } else if !self.required_output_sections.is_empty() {
            self.required_output_sections.clone()
        } else {
            DEFAULT_SECTIONS.iter().map(|s| s.to_string()).collect()
        }
    }

    /// Cross-reference checks serde cannot express. Macro agents may be
    /// given by name or alias.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.roster.is_empty() {
            return Err(DomainError::EmptyRoster);
        }
        let mut seen: Vec<&str> = Vec::new();
        for agent in &self.roster {
            if seen.contains(&agent.name.as_str()) {
                return Err(DomainError::InvalidSchema(format!(
                    "duplicate roster agent '{}'",
                    agent.name
                )));
            }
            seen.push(&agent.name);
        }
        if self.roster.iter().filter(|a| a.lead).count() > 1 {
            return Err(DomainError::InvalidSchema(
                "more than one lead agent".to_string(),
            ));
        }
        for (name, def) in &self.macros {
            let known = |raw: &String| {
                self.roster.iter().any(|r| {
                    r.name.eq_ignore_ascii_case(raw.trim())
                        || r.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(raw.trim()))
                })
            };
            if let Some(unknown) = def.agents.iter().find(|a| !known(a)) {
                return Err(DomainError::InvalidSchema(format!(
                    "macro '{name}' lists unknown agent '{unknown}'"
                )));
            }
        }
        Ok(())
    }

    /// Number of sections the gate requires for a given preset.
    ///
    /// An explicit list requires all of its entries; the default list only
    /// requires the configured count.
    pub fn required_section_count(&self, preset: &MacroPreset) -> usize {
        if !preset.required_sections.is_empty() {
            preset.required_sections.len()
        } else if !self.required_output_sections.is_empty() {
            self.required_output_sections.len()
        } else {
            self.validation.required_section_count
        }
    }
}
