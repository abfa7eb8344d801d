pub mod confidence;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use confidence::{
    data_quality_adjustment, llm_confidence_adjustment, multi_rule_confidence, rule_confidence,
    score_confidence, ConfidenceContext, Strength,
};
pub use error::{LlmError, PipelineError, RagError};
pub use types::{
    AgentConfig, AnalysisInput, CombineLogic, Direction, LlmClientConfig, MetricRecord, Operator,
    ProviderKind, RagConfig, RagSignal, Rule, RuleAction, RuleCondition, ScoreCard, ScoreCriterion,
    Signal,
};
