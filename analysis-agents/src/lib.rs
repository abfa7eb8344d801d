pub mod agent;
pub mod llm;
pub mod orchestrator;

// Re-export commonly used items from the llm module
pub use llm::{
    parse_signal, ChatParams, ChatProvider, LlmClient, OllamaProvider, OpenAiProvider,
    PromptFormatter,
};

// Re-export commonly used items from the agent module
pub use agent::{Agent, HybridAgent, LlmAgent, RagAgent, RuleBasedAgent};

// Re-export the orchestration entry points
pub use orchestrator::{analyze_tickers, analyze_with_agents, run_pipeline};
