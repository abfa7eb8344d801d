pub mod client;
pub mod ollama;
pub mod openai;
pub mod parser;
pub mod prompt;
pub mod provider;

// Re-export commonly used items
pub use client::LlmClient;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use parser::parse_signal;
pub use prompt::PromptFormatter;
pub use provider::{ChatParams, ChatProvider};
