use thiserror::Error;

/// Top-level error type for the decision pipeline.
///
/// Parse failures never appear here: malformed LLM text is recovered
/// internally as a diagnostic neutral signal. Data-quality issues lower
/// confidence instead of failing. What remains is either a validation
/// problem caught at construction time or a systemic LLM/RAG failure.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Rag(#[from] RagError),
}

/// Failures at the LLM provider boundary.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("empty response from provider")]
    EmptyResponse,

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

impl LlmError {
    /// Whether the failure is worth retrying with backoff.
    ///
    /// Timeouts, rate limits, provider-side (5xx-class) errors and empty
    /// responses are transient; auth and bad-request failures are not and
    /// fail fast.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::Timeout(_)
                | LlmError::RateLimited(_)
                | LlmError::Provider(_)
                | LlmError::EmptyResponse
        )
    }
}

/// Failures in document ingestion and retrieval.
#[derive(Error, Debug)]
pub enum RagError {
    #[error("empty document: {0}")]
    EmptyDocument(String),

    #[error("invalid chunking config: {0}")]
    InvalidChunking(String),

    #[error("embedding failed: {0}")]
    Embedding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(LlmError::Timeout(30).is_transient());
        assert!(LlmError::RateLimited("429".to_string()).is_transient());
        assert!(LlmError::Provider("502 bad gateway".to_string()).is_transient());
        assert!(LlmError::EmptyResponse.is_transient());

        assert!(!LlmError::Auth("invalid key".to_string()).is_transient());
        assert!(!LlmError::BadRequest("unknown model".to_string()).is_transient());
        assert!(!LlmError::RetriesExhausted {
            attempts: 3,
            last: "timeout".to_string()
        }
        .is_transient());
    }

    #[test]
    fn test_pipeline_error_conversions() {
        let err: PipelineError = LlmError::EmptyResponse.into();
        assert!(matches!(err, PipelineError::Llm(_)));

        let err: PipelineError = RagError::EmptyDocument("doc-1".to_string()).into();
        assert!(matches!(err, PipelineError::Rag(_)));
    }

    #[test]
    fn test_error_display() {
        let err = LlmError::RetriesExhausted {
            attempts: 3,
            last: "request timed out after 30s".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("3 attempts"));
        assert!(msg.contains("timed out"));
    }
}
