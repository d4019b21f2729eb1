//! Generation backend port
//!
//! The backend is an opaque request/response text service: one prompt in,
//! the first choice's message content out.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during a single backend call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Degenerate response ({0} chars)")]
    Degenerate(usize),

    #[error("Other error: {0}")]
    Other(String),
}

/// Backend for text generation
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Model identifier sent with every request.
    fn model(&self) -> &str;

    /// Send one prompt and return the response text.
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, GatewayError>;
}
