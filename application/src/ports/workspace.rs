//! Working-tree port
//!
//! All paths are relative to the repository root.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Path escapes the repository root: {0}")]
    OutsideRoot(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Read/write access to the checked-out source tree.
pub trait WorkspacePort: Send + Sync {
    fn exists(&self, path: &str) -> bool;

    /// Files matching `pattern`, sorted lexically.
    fn glob(&self, pattern: &str) -> Result<Vec<String>, WorkspaceError>;

    fn file_size(&self, path: &str) -> Option<u64>;

    /// `Ok(None)` when the file does not exist.
    fn read(&self, path: &str) -> Result<Option<String>, WorkspaceError>;

    fn write(&self, path: &str, content: &str) -> Result<(), WorkspaceError>;

    /// Removing a missing file is not an error.
    fn remove(&self, path: &str) -> Result<(), WorkspaceError>;
}
