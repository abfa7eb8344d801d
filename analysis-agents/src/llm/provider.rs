//! Provider trait for LLM backends.
//!
//! The rest of the pipeline depends only on this interface; one adapter per
//! provider is chosen at construction.

use analysis_core::{LlmClientConfig, LlmError};
use async_trait::async_trait;

/// Sampling parameters passed through on every call.
#[derive(Debug, Clone)]
pub struct ChatParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: Option<String>,
}

impl From<&LlmClientConfig> for ChatParams {
    fn from(config: &LlmClientConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            system_prompt: config.system_prompt.clone(),
        }
    }
}

/// Chat capability over a single LLM backend.
///
/// Implementations handle authentication, request formatting, and response
/// extraction for their API, mapping failures onto the [`LlmError`]
/// taxonomy so the client's retry policy can tell transient from fatal.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name (e.g., "openai", "ollama").
    fn name(&self) -> &str;

    /// Send a prompt and return the raw response text.
    async fn chat(&self, prompt: &str, params: &ChatParams) -> Result<String, LlmError>;
}
