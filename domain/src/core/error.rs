//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No agents configured in the roster")]
    EmptyRoster,

    #[error("Unknown agent '{name}'. Valid values: {valid}")]
    UnknownAgent { name: String, valid: String },

    #[error("Invalid macro schema: {0}")]
    InvalidSchema(String),

    #[error("Patch proposal touches disallowed files: {0}")]
    DisallowedFiles(String),
}
