use crate::agent::Agent;
use analysis_core::confidence::{
    data_quality_adjustment, multi_rule_confidence, rule_confidence, score_confidence,
    ConfidenceContext,
};
use analysis_core::{
    AnalysisInput, CombineLogic, Direction, MetricRecord, PipelineError, Rule, ScoreCard, Signal,
};
use async_trait::async_trait;

/// Deterministic threshold-rule agent.
///
/// Ordered rules are evaluated first-match-wins; the matched rule's
/// strength-aware confidence comes from the distance calculator rather
/// than a fixed constant. An optional score card acts as a fallback when
/// no rule matches: points accumulate over all criteria before a single
/// threshold comparison. A condition on a missing metric does not hold,
/// and missing data lowers the final confidence via the completeness
/// adjustment instead of failing.
pub struct RuleBasedAgent {
    name: String,
    rules: Vec<Rule>,
    score_card: Option<ScoreCard>,
}

impl RuleBasedAgent {
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            name: name.into(),
            rules,
            score_card: None,
        }
    }

    pub fn with_score_card(mut self, score_card: ScoreCard) -> Self {
        self.score_card = Some(score_card);
        self
    }

    fn evaluate_rules(&self, record: &MetricRecord) -> Result<Option<Signal>, PipelineError> {
        for rule in &self.rules {
            let mut votes: Vec<(f64, Direction)> = Vec::new();
            let mut matched_parts: Vec<String> = Vec::new();
            let mut all_hold = true;

            for condition in &rule.conditions {
                let value = record.get(&condition.metric);
                let holds = value
                    .map(|v| condition.operator.apply(v, condition.threshold))
                    .unwrap_or(false);

                if !holds {
                    all_hold = false;
                    continue;
                }

                let value = value.unwrap_or(condition.threshold);
                let (confidence, strength) = rule_confidence(&ConfidenceContext::new(
                    value,
                    condition.threshold,
                    condition.operator,
                    rule.action.base_confidence,
                ))?;

                votes.push((confidence, rule.action.direction));
                matched_parts.push(format!(
                    "{} {} {} ({}, {})",
                    condition.metric, condition.operator, condition.threshold, value, strength
                ));
            }

            let satisfied = match rule.logic {
                CombineLogic::All => all_hold,
                CombineLogic::Any => !votes.is_empty(),
            };
            if !satisfied {
                continue;
            }

            // All votes share the rule's direction, so consensus only
            // averages magnitudes here.
            let (_, confidence) = multi_rule_confidence(&votes);
            let completeness = record.completeness(&rule.referenced_metrics());
            let confidence = data_quality_adjustment(confidence, completeness);

            let reasoning = format!(
                "rule '{}' matched: {}",
                rule.name,
                matched_parts.join("; ")
            );

            tracing::debug!(
                "Agent {} matched rule '{}' for {} (confidence {:.2})",
                self.name,
                rule.name,
                record.ticker,
                confidence
            );

            return Ok(Some(Signal::new(
                rule.action.direction,
                confidence,
                reasoning,
            )?));
        }

        Ok(None)
    }

    fn evaluate_score_card(&self, record: &MetricRecord) -> Result<Option<Signal>, PipelineError> {
        let Some(card) = &self.score_card else {
            return Ok(None);
        };

        let mut score = 0.0;
        let mut contributions: Vec<String> = Vec::new();

        for criterion in &card.criteria {
            let Some(value) = record.get(&criterion.metric) else {
                continue;
            };
            if criterion.operator.apply(value, criterion.threshold) {
                score += criterion.points;
                contributions.push(format!(
                    "{} {} {} (+{})",
                    criterion.metric, criterion.operator, criterion.threshold, criterion.points
                ));
            }
        }

        let (direction, confidence) =
            score_confidence(score, card.bullish_threshold, card.bearish_threshold)?;
        let completeness = record.completeness(&card.referenced_metrics());
        let confidence = data_quality_adjustment(confidence, completeness);

        let reasoning = if contributions.is_empty() {
            format!(
                "score card total {} against thresholds [{}, {}]; no criteria met",
                score, card.bearish_threshold, card.bullish_threshold
            )
        } else {
            format!(
                "score card total {} against thresholds [{}, {}]: {}",
                score,
                card.bearish_threshold,
                card.bullish_threshold,
                contributions.join("; ")
            )
        };

        Ok(Some(Signal::new(direction, confidence, reasoning)?))
    }
}

#[async_trait]
impl Agent for RuleBasedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn analyze(&self, input: &AnalysisInput) -> Result<Signal, PipelineError> {
        if let Some(signal) = self.evaluate_rules(&input.record)? {
            return Ok(signal);
        }
        if let Some(signal) = self.evaluate_score_card(&input.record)? {
            return Ok(signal);
        }

        tracing::debug!("Agent {} found no matching rules for {}", self.name, input.ticker());
        Ok(Signal::neutral("no rules matched"))
    }
}
