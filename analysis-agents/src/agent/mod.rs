pub mod hybrid_agent;
pub mod llm_agent;
pub mod rag_agent;
pub mod rule_agent;

// Re-export commonly used items
pub use hybrid_agent::HybridAgent;
pub use llm_agent::LlmAgent;
pub use rag_agent::RagAgent;
pub use rule_agent::RuleBasedAgent;

use analysis_core::{AnalysisInput, PipelineError, Signal};
use async_trait::async_trait;

/// Uniform analysis contract over every agent variant.
///
/// The operation is suspension-capable so an orchestrator can fan out a
/// homogeneous task list; for agents with no I/O (rule evaluation) the
/// async wrapper is a zero-cost pass-through.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name, used in logs and reasoning strings.
    fn name(&self) -> &str;

    /// Analyze one input and produce a signal.
    async fn analyze(&self, input: &AnalysisInput) -> Result<Signal, PipelineError>;
}
