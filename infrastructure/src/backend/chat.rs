//! Chat-completions backend over HTTP.

use super::provider::BackendSettings;
use async_trait::async_trait;
use guildhall_application::ports::generation::{GatewayError, GenerationBackend};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// First choice's message content; any other body is returned verbatim.
pub fn extract_content(raw: &str) -> String {
    serde_json::from_str::<ChatResponse>(raw)
        .ok()
        .and_then(|body| body.choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .unwrap_or_else(|| raw.to_string())
}

fn classify(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_connect() {
        GatewayError::ConnectionError(error.to_string())
    } else {
        GatewayError::RequestFailed(error.to_string())
    }
}

/// Backend for any OpenAI-compatible `chat/completions` endpoint.
pub struct ChatCompletionsBackend {
    client: reqwest::Client,
    settings: BackendSettings,
}

impl ChatCompletionsBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("guildhall/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Other(e.to_string()))?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }
}

#[async_trait]
impl GenerationBackend for ChatCompletionsBackend {
    fn model(&self) -> &str {
        &self.settings.model
    }

    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, GatewayError> {
        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
        };
        debug!(
            "POST {} (model {}, {} prompt chars)",
            self.settings.url,
            self.settings.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&self.settings.url)
            .bearer_auth(&self.settings.token)
            .json(&request)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let raw = response.text().await.map_err(classify)?;
        if !status.is_success() {
            let excerpt: String = raw.chars().take(500).collect();
            return Err(GatewayError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                excerpt
            )));
        }
        Ok(extract_content(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_first_choice() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(extract_content(raw), "hello");
    }

    #[test]
    fn test_unexpected_body_returned_verbatim() {
        assert_eq!(extract_content("plain text"), "plain text");
        let empty = r#"{"choices":[]}"#;
        assert_eq!(extract_content(empty), empty);
        let null_content = r#"{"choices":[{"message":{"content":null}}]}"#;
        assert_eq!(extract_content(null_content), null_content);
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.2,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }
}
