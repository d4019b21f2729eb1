//! Progress notification port
//!
//! Defines the interface for reporting progress during a pipeline run.

use guildhall_domain::GateVerdict;

/// Coarse stages of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Agents,
    GuildReview,
    Patch,
    Apply,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Agents => "agents",
            Stage::GuildReview => "guild review",
            Stage::Patch => "patch",
            Stage::Apply => "apply",
        }
    }
}

/// Callback for progress updates during a run
///
/// Implementations live in the presentation layer.
pub trait ProgressNotifier: Send + Sync {
    fn on_stage_start(&self, stage: Stage, total: usize);

    fn on_agent_start(&self, _agent: &str, _index: usize) {}

    /// `verdict` is the final gate verdict after any retry.
    fn on_agent_complete(&self, agent: &str, verdict: GateVerdict, cache_hit: bool);

    fn on_agent_skipped(&self, _agent: &str) {}

    /// A backend call failed or was degenerate and will be retried.
    fn on_backend_retry(&self, _attempt: u32, _error: &str) {}

    fn on_stage_complete(&self, stage: Stage);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: Stage, _total: usize) {}
    fn on_agent_complete(&self, _agent: &str, _verdict: GateVerdict, _cache_hit: bool) {}
    fn on_stage_complete(&self, _stage: Stage) {}
}
