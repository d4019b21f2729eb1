//! Per-agent outcome records.

use crate::cache::Fingerprint;
use crate::gate::{GateReport, GateVerdict};
use crate::output::{OutputFields, ReasoningSplit};

/// One completed agent invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutputRecord {
    pub agent: String,
    /// Output as produced (or cached), before the size cap.
    pub raw: String,
    /// Public/reasoning split of the capped output.
    pub split: ReasoningSplit,
    /// Fields extracted from the uncapped public text.
    pub fields: OutputFields,
    pub gate: GateReport,
    pub fingerprint: Fingerprint,
    pub cache_hit: bool,
    pub truncated: bool,
    pub latency_ms: u64,
    pub prompt_chars: usize,
    /// Backend calls made, including the gate retry. Zero on a cache hit.
    pub attempts: u32,
}

impl AgentOutputRecord {
    pub fn public_text(&self) -> &str {
        &self.split.public
    }

    pub fn verdict(&self) -> GateVerdict {
        self.gate.verdict
    }
}

/// What happened to a scheduled agent.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome {
    Completed(Box<AgentOutputRecord>),
    Skipped { agent: String, reason: String },
}

impl AgentOutcome {
    pub fn agent(&self) -> &str {
        match self {
            AgentOutcome::Completed(r) => &r.agent,
            AgentOutcome::Skipped { agent, .. } => agent,
        }
    }

    pub fn as_completed(&self) -> Option<&AgentOutputRecord> {
        match self {
            AgentOutcome::Completed(r) => Some(r),
            AgentOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, AgentOutcome::Skipped { .. })
    }
}
