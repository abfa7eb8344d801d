use crate::llm::provider::{ChatParams, ChatProvider};
use analysis_core::LlmError;
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client as OpenAiClient,
};

/// OpenAI-compatible cloud provider.
pub struct OpenAiProvider {
    client: OpenAiClient<OpenAIConfig>,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.into());
        Self {
            client: OpenAiClient::with_config(config),
        }
    }

    /// Point the adapter at a compatible non-OpenAI endpoint.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.into())
            .with_api_base(base_url.into());
        Self {
            client: OpenAiClient::with_config(config),
        }
    }
}

#[async_trait::async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat(&self, prompt: &str, params: &ChatParams) -> Result<String, LlmError> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::new();

        if let Some(system) = &params.system_prompt {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system.as_str())
                    .build()
                    .map_err(|e| LlmError::BadRequest(e.to_string()))?
                    .into(),
            );
        }
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| LlmError::BadRequest(e.to_string()))?
                .into(),
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(params.model.as_str())
            .messages(messages)
            .max_tokens(params.max_tokens)
            .temperature(params.temperature)
            .build()
            .map_err(|e| LlmError::BadRequest(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(classify_error)?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Map API failures onto the shared taxonomy so the retry policy can
/// distinguish transient provider trouble from fatal request problems.
fn classify_error(err: OpenAIError) -> LlmError {
    match err {
        OpenAIError::ApiError(api) => {
            let code = api.code.as_deref().unwrap_or("");
            let kind = api.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key" || kind.contains("authentication") {
                LlmError::Auth(api.message)
            } else if code == "rate_limit_exceeded" || kind.contains("rate_limit") {
                LlmError::RateLimited(api.message)
            } else if kind.contains("invalid_request") {
                LlmError::BadRequest(api.message)
            } else {
                LlmError::Provider(api.message)
            }
        }
        // Network-level failures are worth retrying.
        OpenAIError::Reqwest(e) => LlmError::Provider(e.to_string()),
        other => LlmError::Provider(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::ApiError;

    fn api_error(code: Option<&str>, kind: Option<&str>) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: "boom".to_string(),
            r#type: kind.map(str::to_string),
            param: None,
            code: code.map(str::to_string),
        })
    }

    #[test]
    fn test_auth_errors_fail_fast() {
        let err = classify_error(api_error(Some("invalid_api_key"), None));
        assert!(matches!(err, LlmError::Auth(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_rate_limit_is_transient() {
        let err = classify_error(api_error(Some("rate_limit_exceeded"), None));
        assert!(matches!(err, LlmError::RateLimited(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_invalid_request_fails_fast() {
        let err = classify_error(api_error(None, Some("invalid_request_error")));
        assert!(matches!(err, LlmError::BadRequest(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_unknown_api_error_is_provider() {
        let err = classify_error(api_error(None, Some("server_error")));
        assert!(matches!(err, LlmError::Provider(_)));
        assert!(err.is_transient());
    }
}
