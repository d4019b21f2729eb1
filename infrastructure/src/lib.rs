//! Infrastructure layer for guildhall
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: configuration and macro schema loading,
//! the chat-completions backend, filesystem stores, the metrics ledger,
//! and `git`/shell processes.

pub mod backend;
pub mod config;
pub mod fs;
pub mod logging;
pub mod process;

// Re-export commonly used types
pub use backend::{BackendSettings, ChatCompletionsBackend, ProviderError, ProviderKind};
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLlmConfig, FilePatchConfig,
    FileTaskConfig, SchemaError, SchemaLoader,
};
pub use fs::{FsArtifactStore, FsOutputCache, LocalWorkspace};
pub use logging::{JsonlMetricsLedger, LEDGER_PATH};
pub use process::{GitCli, ShellCommandRunner};
