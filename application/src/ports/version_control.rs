//! Version-control port

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VcsError {
    #[error("Failed to run {command}: {message}")]
    Spawn { command: String, message: String },

    #[error("{command} exited with {code}: {stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },
}

#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Unified diff of the working tree against the index for `paths`.
    async fn diff(&self, paths: &[String]) -> Result<String, VcsError>;

    /// `--numstat` output for `paths`.
    async fn numstat(&self, paths: &[String]) -> Result<String, VcsError>;

    /// Every path `patch` would touch, as reported by the tool that applies
    /// it. Nothing is written.
    async fn patch_paths(&self, patch: &str) -> Result<Vec<String>, VcsError>;

    /// Apply a unified diff to the working tree.
    async fn apply(&self, patch: &str) -> Result<(), VcsError>;
}
