use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Market stance of an analysis result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Bullish => write!(f, "bullish"),
            Direction::Bearish => write!(f, "bearish"),
            Direction::Neutral => write!(f, "neutral"),
        }
    }
}

impl FromStr for Direction {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bullish" => Ok(Direction::Bullish),
            "bearish" => Ok(Direction::Bearish),
            "neutral" => Ok(Direction::Neutral),
            other => Err(PipelineError::Validation(format!(
                "unknown direction: {:?}",
                other
            ))),
        }
    }
}

/// The atomic output of one `analyze()` call: a direction, a calibrated
/// confidence in [0, 1], and a human-readable reasoning string.
///
/// Signals are created once per analysis and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub direction: Direction,
    pub confidence: f64,
    pub reasoning: String,
}

impl Signal {
    /// Create a signal, clamping confidence to [0, 1].
    ///
    /// Returns a validation error when the reasoning is empty.
    pub fn new(
        direction: Direction,
        confidence: f64,
        reasoning: impl Into<String>,
    ) -> Result<Self, PipelineError> {
        let reasoning = reasoning.into();
        if reasoning.trim().is_empty() {
            return Err(PipelineError::Validation(
                "signal reasoning must not be empty".to_string(),
            ));
        }

        Ok(Self {
            direction,
            confidence: confidence.clamp(0.0, 1.0),
            reasoning,
        })
    }

    /// A neutral signal with the moderate default confidence of 0.5.
    ///
    /// Used for no-match and recovered-failure paths, so it never fails:
    /// an empty reasoning is replaced with a placeholder.
    pub fn neutral(reasoning: impl Into<String>) -> Self {
        let mut reasoning = reasoning.into();
        if reasoning.trim().is_empty() {
            reasoning = "no reasoning provided".to_string();
        }

        Self {
            direction: Direction::Neutral,
            confidence: 0.5,
            reasoning,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{:.2}|{}",
            self.direction, self.confidence, self.reasoning
        )
    }
}

/// Result of a RAG analysis: the signal plus the per-query insights the
/// synthesis stage produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagSignal {
    pub signal: Signal,
    pub insights: Vec<String>,
}

impl RagSignal {
    /// A neutral result with no insights, for the not-yet-ingested path.
    pub fn neutral(reasoning: impl Into<String>) -> Self {
        Self {
            signal: Signal::neutral(reasoning),
            insights: Vec::new(),
        }
    }
}
