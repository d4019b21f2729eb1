//! Domain layer for guildhall
//!
//! This crate contains the pure logic of the agent pipeline: macro presets,
//! roster selection, task parsing, context assembly, prompt composition,
//! output extraction, the quality gate, patch grammars and metric records.
//! It has no dependencies on I/O, the backend, or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Party
//!
//! A fixed roster of specialist agents runs over one task per pipeline run:
//!
//! - **Lead**: decomposes the task into per-agent TODO handoffs
//! - **Specialists**: consume the handoff and the accumulated outputs
//! - **Guild Master**: privileged governance agent, only run on its own
//!
//! ## Gate
//!
//! Every output passes the quality gate, which can ask for one retry,
//! warn, or halt the remainder of the run.

pub mod cache;
pub mod context;
pub mod core;
pub mod gate;
pub mod governance;
pub mod macros;
pub mod metrics;
pub mod output;
pub mod patch;
pub mod pipeline;
pub mod prompt;
pub mod review;
pub mod roster;
pub mod task;
pub mod util;

// Re-export commonly used types
pub use cache::Fingerprint;
pub use context::{ContextBudget, FileExcerpt, ScopedFile};
pub use core::error::DomainError;
pub use gate::{GateReport, GateRules, GateVerdict};
pub use governance::{GovernanceContext, GovernanceDirectives};
pub use macros::{
    AgentSpec, ExecutionMode, MacroDefinition, MacroPreset, MacroResolution, MacroSchema,
    QualityGateConfig, RetryPolicy, ValidationRules,
};
pub use metrics::{GateOutcome, MetricRecord, MetricsSummary};
pub use output::{Confidence, MarkerCounts, OutputFields, ReasoningSplit};
pub use patch::{BlockGrammar, DiffStat, EditBlock, MatchTier, PatchProposal};
pub use pipeline::{AgentOutcome, AgentOutputRecord, HaltReason, HaltSource, PipelineRun};
pub use prompt::{AgentPromptInput, ComposedPrompt, PromptLimits, PromptTemplate};
pub use review::{ApiInventory, GuildReview, ReviewVerdict};
pub use roster::{AgentFilter, Roster, Selection, SelectionMode};
pub use task::{ScopeToken, TaskCommand, TaskDocument};
