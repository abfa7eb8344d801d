use crate::llm::provider::{ChatParams, ChatProvider};
use crate::llm::{OllamaProvider, OpenAiProvider};
use analysis_core::{LlmClientConfig, LlmError, PipelineError, ProviderKind};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// LLM client with rate limiting, per-call timeouts and retry logic.
///
/// Transient failures (timeout, rate limit, provider-side errors) retry
/// with exponential backoff up to `max_retries` attempts; auth and
/// bad-request failures fail fast.
pub struct LlmClient {
    provider: Arc<dyn ChatProvider>,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    config: LlmClientConfig,
}

impl LlmClient {
    /// Create a client over the given provider adapter.
    pub fn new(
        config: LlmClientConfig,
        provider: Arc<dyn ChatProvider>,
    ) -> Result<Self, PipelineError> {
        tracing::info!(
            "Initializing LLM client: provider={}, model={}, rate_limit={}/min",
            provider.name(),
            config.model,
            config.requests_per_minute
        );

        let requests_per_minute = NonZeroU32::new(config.requests_per_minute).ok_or_else(|| {
            PipelineError::Validation("requests_per_minute must be > 0".to_string())
        })?;

        let quota = Quota::per_minute(requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            provider,
            rate_limiter,
            config,
        })
    }

    /// Build the provider adapter named by the config.
    ///
    /// OpenAI requires an api key; Ollama talks to the default local
    /// endpoint.
    pub fn from_config(
        config: LlmClientConfig,
        api_key: Option<String>,
    ) -> Result<Self, PipelineError> {
        let provider: Arc<dyn ChatProvider> = match config.provider {
            ProviderKind::OpenAi => {
                let key = api_key.ok_or_else(|| {
                    PipelineError::Validation(
                        "openai provider requires an api key".to_string(),
                    )
                })?;
                Arc::new(OpenAiProvider::new(key))
            }
            ProviderKind::Ollama => Arc::new(OllamaProvider::default()),
        };

        Self::new(config, provider)
    }

    pub fn config(&self) -> &LlmClientConfig {
        &self.config
    }

    /// Send a prompt, returning the raw response text.
    ///
    /// Each attempt is wrapped in the configured timeout; timeout expiry is
    /// treated as a transient failure subject to the retry policy.
    pub async fn chat(&self, prompt: &str) -> Result<String, LlmError> {
        self.rate_limiter.until_ready().await;

        tracing::debug!("Sending prompt to LLM (length: {} chars)", prompt.len());

        let params = ChatParams::from(&self.config);
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..self.config.max_retries {
            let outcome = tokio::time::timeout(
                Duration::from_secs(self.config.timeout_seconds),
                self.provider.chat(prompt, &params),
            )
            .await;

            let error = match outcome {
                Ok(Ok(text)) => {
                    tracing::debug!(
                        "LLM response received: provider={}, length={} chars",
                        self.provider.name(),
                        text.len()
                    );
                    return Ok(text);
                }
                Ok(Err(e)) => e,
                Err(_) => LlmError::Timeout(self.config.timeout_seconds),
            };

            if !error.is_transient() {
                tracing::warn!("LLM call failed fatally, not retrying: {}", error);
                return Err(error);
            }

            if attempt + 1 < self.config.max_retries {
                let backoff_ms = 2_u64.pow(attempt) * 1000;
                tracing::warn!(
                    "LLM call failed (attempt {}/{}), retrying in {}ms: {}",
                    attempt + 1,
                    self.config.max_retries,
                    backoff_ms,
                    error
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
            last_error = Some(error);
        }

        Err(LlmError::RetriesExhausted {
            attempts: self.config.max_retries,
            last: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempts were made".to_string()),
        })
    }
}
