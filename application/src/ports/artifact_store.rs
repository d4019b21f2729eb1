//! Agents-directory port
//!
//! Profiles, guild doctrine, town documents, run reports and proposals all
//! live under one agents directory. Paths are relative to it.

use thiserror::Error;

#[derive(Error, Debug)]
#[error("Artifact I/O error on {path}: {source}")]
pub struct StoreError {
    pub path: String,
    #[source]
    pub source: std::io::Error,
}

pub trait ArtifactStore: Send + Sync {
    /// `None` when the document is missing or unreadable.
    fn read(&self, path: &str) -> Option<String>;

    fn exists(&self, path: &str) -> bool;

    /// Create or overwrite, creating parent directories.
    fn write(&self, path: &str, content: &str) -> Result<(), StoreError>;

    /// Append, creating the file if missing.
    fn append(&self, path: &str, content: &str) -> Result<(), StoreError>;

    /// File names in `dir` ending with `suffix`, sorted ascending.
    fn list(&self, dir: &str, suffix: &str) -> Vec<String>;

    /// Absolute or display form of `path`, for summaries.
    fn display_path(&self, path: &str) -> String;
}
