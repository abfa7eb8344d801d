pub mod config;
pub mod record;
pub mod rule;
pub mod signal;

// Re-export common types
pub use config::{AgentConfig, LlmClientConfig, ProviderKind, RagConfig};
pub use record::{AnalysisInput, MetricRecord};
pub use rule::{CombineLogic, Operator, Rule, RuleAction, RuleCondition, ScoreCard, ScoreCriterion};
pub use signal::{Direction, RagSignal, Signal};
