use crate::error::PipelineError;
use crate::types::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tolerance for `==` comparisons on floating-point metrics.
const EQ_EPSILON: f64 = 1e-9;

/// Comparison operator of a rule condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "==")]
    Eq,
}

impl Operator {
    /// Apply the operator to a metric value and threshold.
    pub fn apply(&self, value: f64, threshold: f64) -> bool {
        match self {
            Operator::Lt => value < threshold,
            Operator::Le => value <= threshold,
            Operator::Gt => value > threshold,
            Operator::Ge => value >= threshold,
            Operator::Eq => (value - threshold).abs() <= EQ_EPSILON,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Eq => "==",
        };
        write!(f, "{}", symbol)
    }
}

impl FromStr for Operator {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "==" => Ok(Operator::Eq),
            other => Err(PipelineError::Validation(format!(
                "invalid operator: {:?}",
                other
            ))),
        }
    }
}

/// A single threshold comparison over a named metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    pub metric: String,
    pub operator: Operator,
    pub threshold: f64,
}

impl RuleCondition {
    pub fn new(metric: impl Into<String>, operator: Operator, threshold: f64) -> Self {
        Self {
            metric: metric.into(),
            operator,
            threshold,
        }
    }
}

/// How multiple conditions of one rule combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombineLogic {
    /// Every condition must hold (AND).
    All,
    /// At least one condition must hold (OR).
    Any,
}

/// What a matched rule contributes to the signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAction {
    pub direction: Direction,
    /// Confidence bias fed into the distance-based calculator.
    pub base_confidence: f64,
    /// Optional position-size hint, carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl RuleAction {
    pub fn new(direction: Direction, base_confidence: f64) -> Self {
        Self {
            direction,
            base_confidence,
            weight: None,
        }
    }
}

/// An ordered, author-defined rule: one or more conditions combined with
/// AND/OR logic, mapping to an action when satisfied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub conditions: Vec<RuleCondition>,
    pub logic: CombineLogic,
    pub action: RuleAction,
}

impl Rule {
    /// Create a rule, validating its shape up front so evaluation has no
    /// failure modes beyond a malformed definition.
    pub fn new(
        name: impl Into<String>,
        conditions: Vec<RuleCondition>,
        logic: CombineLogic,
        action: RuleAction,
    ) -> Result<Self, PipelineError> {
        let name = name.into();
        if conditions.is_empty() {
            return Err(PipelineError::Validation(format!(
                "rule {:?} has no conditions",
                name
            )));
        }
        if !(0.0..=1.0).contains(&action.base_confidence) {
            return Err(PipelineError::Validation(format!(
                "rule {:?} base_confidence {} is outside [0, 1]",
                name, action.base_confidence
            )));
        }

        Ok(Self {
            name,
            conditions,
            logic,
            action,
        })
    }

    /// Convenience constructor for a single-condition rule.
    pub fn simple(
        name: impl Into<String>,
        condition: RuleCondition,
        action: RuleAction,
    ) -> Result<Self, PipelineError> {
        Self::new(name, vec![condition], CombineLogic::All, action)
    }

    /// Names of the metrics this rule reads, in condition order.
    pub fn referenced_metrics(&self) -> Vec<&str> {
        self.conditions.iter().map(|c| c.metric.as_str()).collect()
    }
}

/// One criterion of a score card: points awarded when the comparison holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCriterion {
    pub metric: String,
    pub operator: Operator,
    pub threshold: f64,
    pub points: f64,
}

impl ScoreCriterion {
    pub fn new(
        metric: impl Into<String>,
        operator: Operator,
        threshold: f64,
        points: f64,
    ) -> Self {
        Self {
            metric: metric.into(),
            operator,
            threshold,
            points,
        }
    }
}

/// A score-based rule set: points accumulate across all criteria before a
/// single comparison against the bullish/bearish thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub criteria: Vec<ScoreCriterion>,
    pub bullish_threshold: f64,
    pub bearish_threshold: f64,
}

impl ScoreCard {
    pub fn new(
        criteria: Vec<ScoreCriterion>,
        bullish_threshold: f64,
        bearish_threshold: f64,
    ) -> Result<Self, PipelineError> {
        if criteria.is_empty() {
            return Err(PipelineError::Validation(
                "score card has no criteria".to_string(),
            ));
        }
        if bullish_threshold <= bearish_threshold {
            return Err(PipelineError::Validation(format!(
                "bullish threshold {} must exceed bearish threshold {}",
                bullish_threshold, bearish_threshold
            )));
        }

        Ok(Self {
            criteria,
            bullish_threshold,
            bearish_threshold,
        })
    }

    /// Names of the metrics this card reads, in criterion order.
    pub fn referenced_metrics(&self) -> Vec<&str> {
        self.criteria.iter().map(|c| c.metric.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_apply() {
        assert!(Operator::Lt.apply(14.9, 15.0));
        assert!(!Operator::Lt.apply(15.0, 15.0));
        assert!(Operator::Le.apply(15.0, 15.0));
        assert!(Operator::Gt.apply(0.21, 0.2));
        assert!(Operator::Ge.apply(0.2, 0.2));
        assert!(Operator::Eq.apply(1.0, 1.0 + 1e-12));
        assert!(!Operator::Eq.apply(1.0, 1.1));
    }

    #[test]
    fn test_operator_parsing() {
        assert_eq!("<".parse::<Operator>().unwrap(), Operator::Lt);
        assert_eq!(" >= ".parse::<Operator>().unwrap(), Operator::Ge);
        assert_eq!("==".parse::<Operator>().unwrap(), Operator::Eq);
        assert!("!=".parse::<Operator>().is_err());
        assert!("".parse::<Operator>().is_err());
    }

    #[test]
    fn test_rule_validation() {
        let action = RuleAction::new(Direction::Bullish, 0.8);

        let err = Rule::new("empty", vec![], CombineLogic::All, action.clone());
        assert!(err.is_err());

        let bad_confidence = Rule::simple(
            "bad",
            RuleCondition::new("pe_ratio", Operator::Lt, 15.0),
            RuleAction::new(Direction::Bullish, 1.5),
        );
        assert!(bad_confidence.is_err());

        let ok = Rule::simple(
            "value",
            RuleCondition::new("pe_ratio", Operator::Lt, 15.0),
            action,
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_rule_referenced_metrics() {
        let rule = Rule::new(
            "growth",
            vec![
                RuleCondition::new("revenue_growth", Operator::Gt, 0.15),
                RuleCondition::new("roe", Operator::Gt, 0.12),
            ],
            CombineLogic::All,
            RuleAction::new(Direction::Bullish, 0.7),
        )
        .unwrap();

        assert_eq!(rule.referenced_metrics(), vec!["revenue_growth", "roe"]);
    }

    #[test]
    fn test_score_card_validation() {
        let criteria = vec![ScoreCriterion::new("roe", Operator::Gt, 0.15, 3.0)];

        assert!(ScoreCard::new(criteria.clone(), 5.0, -2.0).is_ok());
        assert!(ScoreCard::new(criteria.clone(), -2.0, 5.0).is_err());
        assert!(ScoreCard::new(criteria, 1.0, 1.0).is_err());
        assert!(ScoreCard::new(vec![], 5.0, -2.0).is_err());
    }

    #[test]
    fn test_rule_serde_round_trip() {
        let rule = Rule::simple(
            "value",
            RuleCondition::new("pe_ratio", Operator::Lt, 15.0),
            RuleAction::new(Direction::Bullish, 0.8),
        )
        .unwrap();

        let json = serde_json::to_string(&rule).unwrap();
        assert!(json.contains("\"<\""));
        let back: Rule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);
    }
}
