use crate::agent::Agent;
use analysis_core::confidence::multi_rule_confidence;
use analysis_core::{AnalysisInput, Direction, PipelineError, Signal};
use async_trait::async_trait;
use std::sync::Arc;

/// Two-stage agent: a cheap rule-based filter gates a selective, expensive
/// LLM/RAG escalation stage.
///
/// Inputs that leave the filter neutral never reach the escalation agent,
/// bounding API cost across a large input set. When escalation runs, both
/// signals are merged by consensus: agreement keeps the confidence,
/// disagreement penalizes it.
pub struct HybridAgent {
    name: String,
    filter: Arc<dyn Agent>,
    escalation: Arc<dyn Agent>,
}

impl HybridAgent {
    pub fn new(
        name: impl Into<String>,
        filter: Arc<dyn Agent>,
        escalation: Arc<dyn Agent>,
    ) -> Self {
        Self {
            name: name.into(),
            filter,
            escalation,
        }
    }
}

/// Merge the filter and escalation signals into one consensus signal.
pub(crate) fn combine_signals(gate: &Signal, deep: &Signal) -> Result<Signal, PipelineError> {
    let votes = [
        (gate.confidence, gate.direction),
        (deep.confidence, deep.direction),
    ];
    let (direction, confidence) = multi_rule_confidence(&votes);

    Signal::new(
        direction,
        confidence,
        format!("filter: {} | analysis: {}", gate.reasoning, deep.reasoning),
    )
}

#[async_trait]
impl Agent for HybridAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn analyze(&self, input: &AnalysisInput) -> Result<Signal, PipelineError> {
        let gate = self.filter.analyze(input).await?;

        if gate.direction == Direction::Neutral {
            tracing::debug!(
                "Agent {} filter stayed neutral for {}; skipping escalation",
                self.name,
                input.ticker()
            );
            return Ok(gate);
        }

        tracing::info!(
            "Agent {} escalating {} (filter: {} at {:.2})",
            self.name,
            input.ticker(),
            gate.direction,
            gate.confidence
        );

        let deep = self.escalation.analyze(input).await?;
        combine_signals(&gate, &deep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::RuleBasedAgent;
    use analysis_core::{MetricRecord, Operator, Rule, RuleAction, RuleCondition};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Escalation stand-in that counts invocations.
    struct CountingAgent {
        calls: AtomicUsize,
        signal: Signal,
    }

    impl CountingAgent {
        fn new(signal: Signal) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                signal,
            }
        }
    }

    #[async_trait]
    impl Agent for CountingAgent {
        fn name(&self) -> &str {
            "counting"
        }

        async fn analyze(&self, _input: &AnalysisInput) -> Result<Signal, PipelineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.signal.clone())
        }
    }

    fn filter() -> Arc<RuleBasedAgent> {
        Arc::new(RuleBasedAgent::new(
            "filter",
            vec![Rule::simple(
                "cheap",
                RuleCondition::new("pe_ratio", Operator::Lt, 15.0),
                RuleAction::new(Direction::Bullish, 0.8),
            )
            .unwrap()],
        ))
    }

    fn input(pe_ratio: f64) -> AnalysisInput {
        AnalysisInput::new(MetricRecord::new("AAPL").with_metric("pe_ratio", pe_ratio))
    }

    #[tokio::test]
    async fn test_neutral_filter_skips_escalation() {
        let escalation = Arc::new(CountingAgent::new(
            Signal::new(Direction::Bullish, 0.9, "deep analysis").unwrap(),
        ));
        let agent = HybridAgent::new("hybrid", filter(), escalation.clone());

        let signal = agent.analyze(&input(40.0)).await.unwrap();
        assert_eq!(signal.direction, Direction::Neutral);
        assert_eq!(escalation.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_triggered_filter_escalates() {
        let escalation = Arc::new(CountingAgent::new(
            Signal::new(Direction::Bullish, 0.9, "LLM agrees, margin 30%").unwrap(),
        ));
        let agent = HybridAgent::new("hybrid", filter(), escalation.clone());

        let signal = agent.analyze(&input(8.0)).await.unwrap();
        assert_eq!(escalation.calls.load(Ordering::SeqCst), 1);
        assert_eq!(signal.direction, Direction::Bullish);
        assert!(signal.reasoning.contains("filter:"));
        assert!(signal.reasoning.contains("analysis:"));
    }

    #[tokio::test]
    async fn test_disagreement_penalizes_confidence() {
        let agree = Arc::new(CountingAgent::new(
            Signal::new(Direction::Bullish, 0.8, "agrees").unwrap(),
        ));
        let disagree = Arc::new(CountingAgent::new(
            Signal::new(Direction::Bearish, 0.8, "disagrees").unwrap(),
        ));

        let agreeing = HybridAgent::new("a", filter(), agree);
        let disagreeing = HybridAgent::new("b", filter(), disagree);

        let agreed = agreeing.analyze(&input(8.0)).await.unwrap();
        let split = disagreeing.analyze(&input(8.0)).await.unwrap();

        assert_eq!(agreed.direction, Direction::Bullish);
        // Opposed votes collapse to neutral with a confidence penalty.
        assert_eq!(split.direction, Direction::Neutral);
        assert!(split.confidence < agreed.confidence);
    }

    #[tokio::test]
    async fn test_escalation_error_propagates() {
        struct FailingAgent;

        #[async_trait]
        impl Agent for FailingAgent {
            fn name(&self) -> &str {
                "failing"
            }

            async fn analyze(&self, _input: &AnalysisInput) -> Result<Signal, PipelineError> {
                Err(PipelineError::Validation("boom".to_string()))
            }
        }

        let agent = HybridAgent::new("hybrid", filter(), Arc::new(FailingAgent));
        assert!(agent.analyze(&input(8.0)).await.is_err());
    }
}
