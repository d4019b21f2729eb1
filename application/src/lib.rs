//! Application layer for guildhall
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{PatchLimits, PipelineConfig, TaskMode};
pub use ports::{
    artifact_store::{ArtifactStore, StoreError},
    command_runner::{CommandOutput, CommandRunner},
    generation::{GatewayError, GenerationBackend},
    metrics_ledger::{MetricsLedger, NoMetricsLedger},
    output_cache::{CacheError, NoCache, OutputCache},
    progress::{NoProgress, ProgressNotifier, Stage},
    version_control::{VcsError, VersionControl},
    workspace::{WorkspaceError, WorkspacePort},
};
pub use use_cases::apply_patch::{ApplyError, ApplyPatchUseCase, ApplyReport};
pub use use_cases::generate::{Generation, GenerationClient, GenerationError};
pub use use_cases::generate_patch::{
    GeneratePatchUseCase, PatchArtifact, PatchGenerationError, PatchReport, PatchSource,
};
pub use use_cases::run_autorun::{
    ApplyStatus, AutorunError, AutorunPorts, AutorunReport, RunAutorunUseCase, TaskSource,
};
pub use use_cases::run_pipeline::{PipelineError, RunPipelineUseCase};
