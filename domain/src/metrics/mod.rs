//! Per-invocation metric records and the trailing-window dashboard.

pub mod record;
pub mod summary;

pub use record::{GateOutcome, MetricRecord};
pub use summary::{AgentReliability, MetricsSummary};
