//! Confidence calibration.
//!
//! Pure, stateless functions that turn raw signals (threshold distance,
//! score margin, multi-rule agreement, LLM self-reports, data completeness)
//! into a calibrated confidence in [0, 1]. Nothing here holds state, so
//! every function is safe under concurrent invocation.
//!
//! The distance-to-confidence mapping is a clipped-linear multiplier on the
//! caller's base confidence:
//!
//! ```text
//! m(d) = 0.75 + 0.9375 * d,   clipped at 1.125 (saturates at d = 0.4)
//! confidence = clamp(base * m(d), 0, 0.99)
//! ```
//!
//! A threshold that is only just crossed therefore *discounts* the base
//! (weak evidence), while a wide crossing boosts it, approaching but never
//! reaching 1.0.

use crate::error::PipelineError;
use crate::types::{Direction, Operator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Guard against division by a zero threshold.
pub const EPSILON: f64 = 1e-9;

/// Multiplier curve breakpoints. m(0) = 0.75; saturation at d = 0.4 where
/// m = 1.125.
const CURVE_INTERCEPT: f64 = 0.75;
const CURVE_SLOPE: f64 = 0.9375;
const CURVE_CEILING: f64 = 1.125;

/// Confidence never reaches 1.0, however wide the margin.
const CONFIDENCE_CEILING: f64 = 0.99;

/// Fixed base fed into the margin curve by score-based evaluation.
const SCORE_BASE_CONFIDENCE: f64 = 0.7;

/// Moderate confidence reported when a score sits strictly between the
/// bullish and bearish thresholds.
const NEUTRAL_SCORE_CONFIDENCE: f64 = 0.5;

/// Discounts applied to LLM self-reported confidence.
const MIN_REASONING_CHARS: usize = 40;
const SHORT_REASONING_DISCOUNT: f64 = 0.8;
const NO_FIGURES_DISCOUNT: f64 = 0.85;

/// How decisively a threshold was crossed, by normalized distance band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    BarelyMet,
    ModeratelyMet,
    StronglyMet,
    VeryStronglyMet,
}

impl Strength {
    fn from_distance(distance: f64) -> Self {
        if distance < 0.05 {
            Strength::BarelyMet
        } else if distance < 0.15 {
            Strength::ModeratelyMet
        } else if distance < 0.40 {
            Strength::StronglyMet
        } else {
            Strength::VeryStronglyMet
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strength::BarelyMet => "barely met",
            Strength::ModeratelyMet => "moderately met",
            Strength::StronglyMet => "strongly met",
            Strength::VeryStronglyMet => "very strongly met",
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input to distance-based confidence scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceContext {
    pub metric_value: f64,
    pub threshold: f64,
    pub operator: Operator,
    pub base_confidence: f64,
}

impl ConfidenceContext {
    pub fn new(
        metric_value: f64,
        threshold: f64,
        operator: Operator,
        base_confidence: f64,
    ) -> Self {
        Self {
            metric_value,
            threshold,
            operator,
            base_confidence,
        }
    }
}

/// Clipped-linear multiplier over normalized distance.
fn distance_multiplier(distance: f64) -> f64 {
    (CURVE_INTERCEPT + CURVE_SLOPE * distance).min(CURVE_CEILING)
}

/// Strength-aware confidence for one satisfied threshold condition.
///
/// Normalized distance is `|metric_value - threshold| / max(|threshold|, ε)`,
/// mapped through the clipped-linear curve and applied to the base
/// confidence. Monotonically non-decreasing in distance.
pub fn rule_confidence(ctx: &ConfidenceContext) -> Result<(f64, Strength), PipelineError> {
    if !(0.0..=1.0).contains(&ctx.base_confidence) {
        return Err(PipelineError::Validation(format!(
            "base_confidence {} is outside [0, 1]",
            ctx.base_confidence
        )));
    }

    let distance = (ctx.metric_value - ctx.threshold).abs() / ctx.threshold.abs().max(EPSILON);
    let confidence =
        (ctx.base_confidence * distance_multiplier(distance)).clamp(0.0, CONFIDENCE_CEILING);

    Ok((confidence, Strength::from_distance(distance)))
}

/// Consensus confidence across several rule evaluations.
///
/// The majority direction wins (an even split resolves to neutral); the
/// aggregate is the mean confidence of the majority votes scaled by the
/// fraction of rules in agreement, and is bounded above by the maximum
/// single-rule confidence. Disagreement therefore always costs confidence.
pub fn multi_rule_confidence(votes: &[(f64, Direction)]) -> (Direction, f64) {
    if votes.is_empty() {
        return (Direction::Neutral, 0.0);
    }

    let mut counts: HashMap<Direction, usize> = HashMap::new();
    for (_, direction) in votes {
        *counts.entry(*direction).or_insert(0) += 1;
    }

    let top_count = counts.values().copied().max().unwrap_or(0);
    let leaders: Vec<Direction> = counts
        .iter()
        .filter(|(_, count)| **count == top_count)
        .map(|(direction, _)| *direction)
        .collect();
    let unique_majority = leaders.len() == 1;

    let majority = if unique_majority {
        leaders[0]
    } else {
        // Even split: no camp to follow.
        Direction::Neutral
    };

    let agreement = top_count as f64 / votes.len() as f64;

    let magnitudes: Vec<f64> = if unique_majority {
        votes
            .iter()
            .filter(|(_, direction)| *direction == majority)
            .map(|(confidence, _)| *confidence)
            .collect()
    } else {
        votes.iter().map(|(confidence, _)| *confidence).collect()
    };
    let average = magnitudes.iter().sum::<f64>() / magnitudes.len() as f64;

    let max_single = votes
        .iter()
        .map(|(confidence, _)| *confidence)
        .fold(0.0_f64, f64::max);

    let confidence = (average * agreement).min(max_single).clamp(0.0, 1.0);

    (majority, confidence)
}

/// Direction and confidence from an accumulated score against a pair of
/// thresholds.
///
/// Crossing a threshold (inclusive) determines the direction; the margin
/// past it runs through the same clipped-linear curve as
/// [`rule_confidence`], over a fixed 0.7 base. A score strictly between the
/// thresholds is neutral at 0.5.
pub fn score_confidence(
    score: f64,
    bullish_threshold: f64,
    bearish_threshold: f64,
) -> Result<(Direction, f64), PipelineError> {
    if bullish_threshold <= bearish_threshold {
        return Err(PipelineError::Validation(format!(
            "bullish threshold {} must exceed bearish threshold {}",
            bullish_threshold, bearish_threshold
        )));
    }

    let (direction, margin, crossed) = if score >= bullish_threshold {
        (Direction::Bullish, score - bullish_threshold, bullish_threshold)
    } else if score <= bearish_threshold {
        (Direction::Bearish, bearish_threshold - score, bearish_threshold)
    } else {
        return Ok((Direction::Neutral, NEUTRAL_SCORE_CONFIDENCE));
    };

    let normalized = margin / crossed.abs().max(EPSILON);
    let confidence =
        (SCORE_BASE_CONFIDENCE * distance_multiplier(normalized)).clamp(0.0, CONFIDENCE_CEILING);

    Ok((direction, confidence))
}

/// Penalize signals built on mostly-missing fields.
///
/// The multiplier runs from 0.5 (nothing present) to 1.0 (fully complete).
pub fn data_quality_adjustment(confidence: f64, completeness_ratio: f64) -> f64 {
    let ratio = completeness_ratio.clamp(0.0, 1.0);
    (confidence * (0.5 + 0.5 * ratio)).clamp(0.0, 1.0)
}

/// Discount an LLM's self-reported confidence when its reasoning is thin.
///
/// Short reasoning (< 40 chars) and reasoning citing no concrete figure
/// each apply a discount; the result stays in [0, 1].
pub fn llm_confidence_adjustment(reported_confidence: f64, reasoning: &str) -> f64 {
    let mut confidence = reported_confidence.clamp(0.0, 1.0);

    let reasoning = reasoning.trim();
    if reasoning.chars().count() < MIN_REASONING_CHARS {
        confidence *= SHORT_REASONING_DISCOUNT;
    }
    if !reasoning.chars().any(|c| c.is_ascii_digit()) {
        confidence *= NO_FIGURES_DISCOUNT;
    }

    confidence.clamp(0.0, 1.0)
}
