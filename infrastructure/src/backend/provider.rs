//! Backend provider resolution.
//!
//! Both providers speak the same chat-completions protocol; they differ in
//! default endpoint, default model and which credential they use.

use crate::config::FileLlmConfig;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_GITHUB_URL: &str = "https://api.githubcopilot.com/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    GitHub,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::GitHub => write!(f, "github"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Unknown LLM provider '{0}'. Valid values: auto, openai, github")]
    UnknownProvider(String),

    #[error("Missing credentials: set LLM_API_KEY (openai) or GITHUB_TOKEN (github)")]
    MissingCredentials,

    #[error("Missing LLM_MODEL for GitHub Models")]
    MissingModel,
}

/// Fully resolved connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendSettings {
    pub kind: ProviderKind,
    pub url: String,
    pub model: String,
    pub token: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSettings")
            .field("kind", &self.kind)
            .field("url", &self.url)
            .field("model", &self.model)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

impl BackendSettings {
    /// `auto` picks openai when an API key is present, else github when a
    /// GitHub token is present.
    pub fn resolve(llm: &FileLlmConfig) -> Result<Self, ProviderError> {
        let api_key = non_blank(&llm.api_key);
        let github_token = non_blank(&llm.github_token);
        let kind = match llm.provider.trim().to_lowercase().as_str() {
            "" | "auto" => {
                if api_key.is_some() {
                    ProviderKind::OpenAi
                } else if github_token.is_some() {
                    ProviderKind::GitHub
                } else {
                    return Err(ProviderError::MissingCredentials);
                }
            }
            "openai" => ProviderKind::OpenAi,
            "github" => ProviderKind::GitHub,
            other => return Err(ProviderError::UnknownProvider(other.to_string())),
        };

        let url = non_blank(&llm.api_url);
        let model = non_blank(&llm.model);
        let (url, model, token) = match kind {
            ProviderKind::OpenAi => (
                url.unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
                model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                api_key,
            ),
            ProviderKind::GitHub => (
                url.unwrap_or_else(|| DEFAULT_GITHUB_URL.to_string()),
                model.ok_or(ProviderError::MissingModel)?,
                github_token,
            ),
        };

        Ok(Self {
            kind,
            url,
            model,
            token: token.ok_or(ProviderError::MissingCredentials)?,
            timeout: Duration::from_secs(llm.timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm(provider: &str, api_key: Option<&str>, token: Option<&str>, model: Option<&str>) -> FileLlmConfig {
        FileLlmConfig {
            provider: provider.to_string(),
            api_key: api_key.map(String::from),
            github_token: token.map(String::from),
            model: model.map(String::from),
            ..FileLlmConfig::default()
        }
    }

    #[test]
    fn test_auto_prefers_api_key() {
        let settings = BackendSettings::resolve(&llm("auto", Some("sk"), Some("gh"), None)).unwrap();
        assert_eq!(settings.kind, ProviderKind::OpenAi);
        assert_eq!(settings.url, DEFAULT_OPENAI_URL);
        assert_eq!(settings.model, DEFAULT_OPENAI_MODEL);
        assert_eq!(settings.token, "sk");
        assert_eq!(settings.timeout, Duration::from_secs(180));
    }

    #[test]
    fn test_auto_falls_back_to_github() {
        let settings =
            BackendSettings::resolve(&llm("auto", Some(" "), Some("gh"), Some("gpt-4.1"))).unwrap();
        assert_eq!(settings.kind, ProviderKind::GitHub);
        assert_eq!(settings.url, DEFAULT_GITHUB_URL);
    }

    #[test]
    fn test_resolution_errors() {
        assert_eq!(
            BackendSettings::resolve(&llm("auto", None, None, None)),
            Err(ProviderError::MissingCredentials)
        );
        assert_eq!(
            BackendSettings::resolve(&llm("github", None, Some("gh"), None)),
            Err(ProviderError::MissingModel)
        );
        assert_eq!(
            BackendSettings::resolve(&llm("openai", None, Some("gh"), None)),
            Err(ProviderError::MissingCredentials)
        );
        assert_eq!(
            BackendSettings::resolve(&llm("azure", Some("sk"), None, None)),
            Err(ProviderError::UnknownProvider("azure".to_string()))
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let settings = BackendSettings::resolve(&llm("openai", Some("secret"), None, None)).unwrap();
        assert!(!format!("{settings:?}").contains("secret"));
    }
}
