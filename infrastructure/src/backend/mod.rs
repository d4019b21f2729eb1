//! Generation backend adapters.

pub mod chat;
pub mod provider;

pub use chat::ChatCompletionsBackend;
pub use provider::{BackendSettings, ProviderError, ProviderKind};
