use serde::{Deserialize, Serialize};

/// Supported LLM provider backends, selected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible cloud API.
    OpenAi,
    /// Local Ollama server.
    Ollama,
}

/// Configuration for the LLM client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmClientConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    pub max_retries: u32,
    pub timeout_seconds: u64,
    pub requests_per_minute: u32,
}

impl Default for LlmClientConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            model: "gpt-4-turbo".to_string(),
            temperature: 0.1,
            max_tokens: 500,
            system_prompt: None,
            max_retries: 3,
            timeout_seconds: 30,
            requests_per_minute: 10,
        }
    }
}

/// Configuration for document chunking and retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagConfig {
    /// Target chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of highest-scoring chunks returned per query.
    pub top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 3,
        }
    }
}

/// Per-agent configuration. Both sub-configs are optional: a pure
/// rule-based agent carries neither, and LLM/RAG machinery is only built
/// when the corresponding section is present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmClientConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rag: Option<RagConfig>,
}

impl AgentConfig {
    pub fn with_llm(mut self, llm: LlmClientConfig) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_rag(mut self, rag: RagConfig) -> Self {
        self.rag = Some(rag);
        self
    }
}
