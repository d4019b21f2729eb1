//! Application-level configuration.
//!
//! - [`PipelineConfig`]: run-wide knobs, immutable once built
//! - [`PatchLimits`]: guarded-apply size limits

pub mod pipeline_config;

pub use pipeline_config::{PatchLimits, PipelineConfig, TaskMode};
