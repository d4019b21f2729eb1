//! Generation client: one backend call with retry and backoff.

use crate::ports::generation::{GatewayError, GenerationBackend};
use crate::ports::progress::ProgressNotifier;
use guildhall_domain::{ComposedPrompt, RetryPolicy};
use guildhall_domain::core::string::prefix;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Responses this short (after trimming) count as degenerate.
pub const DEGENERATE_CHARS: usize = 10;

const PROMPT_CUT_MARKER: &str = "\n\n... [prompt truncated at ceiling] ...";

/// Exhausting the retry budget is fatal for the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Generation failed after {attempts} attempts: {last}")]
pub struct GenerationError {
    pub attempts: u32,
    pub last: GatewayError,
}

/// A successful call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    /// Backend calls made, including failed ones.
    pub attempts: u32,
    pub latency: Duration,
    /// Characters actually sent.
    pub prompt_chars: usize,
}

/// Retrying wrapper around a [`GenerationBackend`].
pub struct GenerationClient<B: GenerationBackend + ?Sized> {
    backend: Arc<B>,
    retry: RetryPolicy,
    prompt_ceiling: usize,
}

impl<B: GenerationBackend + ?Sized> GenerationClient<B> {
    pub fn new(backend: Arc<B>, retry: RetryPolicy, prompt_ceiling: usize) -> Self {
        Self {
            backend,
            retry,
            prompt_ceiling,
        }
    }

    /// Call the backend, retrying on failure or a degenerate response.
    ///
    /// Prompts over the ceiling are cut with a marker before sending.
    pub async fn call(
        &self,
        prompt: &str,
        temperature: f32,
        progress: &dyn ProgressNotifier,
    ) -> Result<Generation, GenerationError> {
        if prompt.len() > self.prompt_ceiling {
            warn!(
                "Prompt of {} chars exceeds ceiling {}, truncating",
                prompt.len(),
                self.prompt_ceiling
            );
            let cut = format!("{}{}", prefix(prompt, self.prompt_ceiling), PROMPT_CUT_MARKER);
            return self.send(&cut, temperature, progress).await;
        }
        self.send(prompt, temperature, progress).await
    }

    /// Send a prompt the composer already fitted, without cutting it.
    ///
    /// A composed prompt over the ceiling holds only sections that must
    /// reach the model whole (task text and output contract), so it goes
    /// out as is.
    pub async fn call_composed(
        &self,
        prompt: &ComposedPrompt,
        temperature: f32,
        progress: &dyn ProgressNotifier,
    ) -> Result<Generation, GenerationError> {
        if prompt.over_ceiling {
            warn!(
                "Composed prompt of {} chars exceeds ceiling {} after trimming; sending untrimmable sections intact",
                prompt.text.len(),
                self.prompt_ceiling
            );
        }
        self.send(&prompt.text, temperature, progress).await
    }

    async fn send(
        &self,
        prompt: &str,
        temperature: f32,
        progress: &dyn ProgressNotifier,
    ) -> Result<Generation, GenerationError> {
        let started = Instant::now();
        let max_attempts = self.retry.attempts();
        let mut last = GatewayError::Other("no attempt made".to_string());

        for attempt in 1..=max_attempts {
            debug!(
                "Backend call attempt {}/{} to {}",
                attempt,
                max_attempts,
                self.backend.model()
            );
            match self.backend.complete(prompt, temperature).await {
                Ok(text) if text.trim().len() > DEGENERATE_CHARS => {
                    return Ok(Generation {
                        text,
                        attempts: attempt,
                        latency: started.elapsed(),
                        prompt_chars: prompt.len(),
                    });
                }
                Ok(text) => last = GatewayError::Degenerate(text.trim().len()),
                Err(e) => last = e,
            }

            if attempt < max_attempts {
                let wait = self.retry.backoff_for(attempt - 1);
                warn!(
                    "Backend attempt {} failed ({}), retrying in {:?}",
                    attempt, last, wait
                );
                progress.on_backend_retry(attempt, &last.to_string());
                tokio::time::sleep(wait).await;
            }
        }

        info!("Backend retries exhausted after {} attempts", max_attempts);
        Err(GenerationError {
            attempts: max_attempts,
            last,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoProgress;
    use crate::test_support::{ScriptedBackend, instant_retry};

    const GOOD: &str = "A perfectly reasonable response.";

    #[tokio::test]
    async fn test_first_attempt_succeeds() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(GOOD.to_string())]));
        let client = GenerationClient::new(backend.clone(), instant_retry(3), 1000);
        let out = client.call("prompt", 0.2, &NoProgress).await.unwrap();
        assert_eq!(out.text, GOOD);
        assert_eq!(out.attempts, 1);
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_retries_network_and_degenerate() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(GatewayError::Timeout),
            Ok("  ok  ".to_string()),
            Ok(GOOD.to_string()),
        ]));
        let client = GenerationClient::new(backend.clone(), instant_retry(3), 1000);
        let out = client.call("prompt", 0.2, &NoProgress).await.unwrap();
        assert_eq!(out.attempts, 3);
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_last_error() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(GatewayError::Timeout),
            Err(GatewayError::ConnectionError("refused".to_string())),
        ]));
        let client = GenerationClient::new(backend, instant_retry(2), 1000);
        let err = client.call("prompt", 0.2, &NoProgress).await.unwrap_err();
        assert_eq!(err.attempts, 2);
        assert_eq!(err.last, GatewayError::ConnectionError("refused".to_string()));
    }

    #[tokio::test]
    async fn test_oversized_prompt_is_truncated() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(GOOD.to_string())]));
        let client = GenerationClient::new(backend.clone(), instant_retry(1), 50);
        let out = client.call(&"x".repeat(500), 0.2, &NoProgress).await.unwrap();
        assert!(out.prompt_chars < 500);
        assert!(backend.prompts()[0].contains("truncated"));
    }

    #[tokio::test]
    async fn test_composed_prompt_is_never_cut() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(GOOD.to_string())]));
        let client = GenerationClient::new(backend.clone(), instant_retry(1), 50);
        let prompt = ComposedPrompt {
            text: format!("{}\nReturn markdown with these exact sections:", "t".repeat(100)),
            trims: Vec::new(),
            over_ceiling: true,
        };
        let out = client.call_composed(&prompt, 0.2, &NoProgress).await.unwrap();
        assert_eq!(out.prompt_chars, prompt.text.len());
        assert_eq!(backend.prompts()[0], prompt.text);
    }
}
