//! The resolved, immutable macro record.

use super::schema::MacroDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How agents see each other's work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Each agent receives prior outputs and handoff TODOs.
    #[default]
    Sequential,
    /// Each agent works alone; calls still run one at a time.
    Independent,
}

impl ExecutionMode {
    pub fn is_independent(&self) -> bool {
        matches!(self, ExecutionMode::Independent)
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Independent => write!(f, "independent"),
        }
    }
}

/// Every knob a run needs, with all fallbacks already applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroPreset {
    /// Canonical macro name, `None` when no macro is active.
    pub name: Option<String>,
    /// Agents selected by the macro. Empty means "use operator filters".
    pub agents: Vec<String>,
    pub mode: ExecutionMode,
    pub temperature: f32,
    /// Custom section contract. Empty means the default nine sections.
    pub required_sections: Vec<String>,
    pub directives: BTreeMap<String, String>,
    pub handoff_chars: usize,
    pub context_chars: usize,
    pub cross_confirm: bool,
    pub max_output_chars: usize,
    pub produces_patch: bool,
    pub guild_review: bool,
    pub retry_on_gate_fail: bool,
}

impl MacroPreset {
    pub(crate) fn overlay(mut self, name: &str, def: &MacroDefinition) -> Self {
        self.name = Some(name.to_string());
        self.agents = def.agents.clone();
        self.mode = def.mode;
        if let Some(t) = def.temperature {
            self.temperature = t;
        }
        if !def.required_sections.is_empty() {
            self.required_sections = def.required_sections.clone();
        }
        self.directives = def.directives.clone();
        if let Some(v) = def.handoff_chars {
            self.handoff_chars = v;
        }
        if let Some(v) = def.context_chars {
            self.context_chars = v;
        }
        if let Some(v) = def.cross_confirm {
            self.cross_confirm = v;
        }
        if let Some(v) = def.max_output_chars {
            self.max_output_chars = v;
        }
        if let Some(v) = def.produces_patch {
            self.produces_patch = v;
        }
        if let Some(v) = def.guild_review {
            self.guild_review = v;
        }
        if let Some(v) = def.retry_on_gate_fail {
            self.retry_on_gate_fail = v;
        }
        self
    }

    /// Name used in fingerprints, run ids, and metrics.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("none")
    }

    /// Per-agent directive, matched case-insensitively on the agent name.
    pub fn directive_for(&self, agent: &str) -> Option<&str> {
        self.directives
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(agent))
            .map(|(_, v)| v.as_str())
    }
}

/// Outcome of a macro lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum MacroResolution {
    /// No macro requested.
    Default(MacroPreset),
    /// A macro with this name exists.
    Named(MacroPreset),
    /// The name did not match; `fallback` is the base preset.
    Unknown {
        requested: String,
        fallback: MacroPreset,
    },
}

impl MacroResolution {
    pub fn preset(&self) -> &MacroPreset {
        match self {
            MacroResolution::Default(p) | MacroResolution::Named(p) => p,
            MacroResolution::Unknown { fallback, .. } => fallback,
        }
    }

    pub fn into_preset(self) -> MacroPreset {
        match self {
            MacroResolution::Default(p) | MacroResolution::Named(p) => p,
            MacroResolution::Unknown { fallback, .. } => fallback,
        }
    }
}
