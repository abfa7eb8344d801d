//! Parser for the `direction|confidence|reasoning` response format.
//!
//! Parsing never fails: malformed text degrades to a neutral signal with a
//! diagnostic reasoning string, so one bad response cannot abort a batch of
//! concurrent analyses.

use analysis_core::{Direction, Signal};
use std::str::FromStr;

const SNIPPET_CHARS: usize = 80;

/// Parse raw LLM text into a signal.
///
/// Tolerant of whitespace, case, and confidence expressed on a 0-100 or
/// 0-1 scale. Malformed input yields a neutral signal carrying a
/// diagnostic reasoning string.
pub fn parse_signal(raw: &str) -> Signal {
    match try_parse(raw) {
        Ok(signal) => signal,
        Err(reason) => {
            tracing::warn!("Could not parse LLM response ({}), degrading to neutral", reason);
            Signal::neutral(format!(
                "unparseable LLM response ({}): {:?}",
                reason,
                snippet(raw)
            ))
        }
    }
}

fn try_parse(raw: &str) -> Result<Signal, String> {
    let mut parts = raw.trim().splitn(3, '|');

    let direction_part = parts.next().ok_or("missing direction")?;
    let confidence_part = parts.next().ok_or("missing confidence")?;
    let reasoning_part = parts.next().ok_or("missing reasoning")?;

    let direction = parse_direction(direction_part)?;
    let confidence = parse_confidence(confidence_part)?;

    let reasoning = reasoning_part.trim();
    if reasoning.is_empty() {
        return Err("empty reasoning".to_string());
    }

    Signal::new(direction, confidence, reasoning).map_err(|e| e.to_string())
}

/// Accept the bare word, or a segment that mentions exactly one direction
/// (models often prefix a label such as "Direction: bullish").
fn parse_direction(segment: &str) -> Result<Direction, String> {
    if let Ok(direction) = Direction::from_str(segment) {
        return Ok(direction);
    }

    let lower = segment.to_lowercase();
    let mentioned: Vec<Direction> = [
        (Direction::Bullish, "bullish"),
        (Direction::Bearish, "bearish"),
        (Direction::Neutral, "neutral"),
    ]
    .into_iter()
    .filter(|(_, word)| lower.contains(word))
    .map(|(direction, _)| direction)
    .collect();

    match mentioned.as_slice() {
        [single] => Ok(*single),
        [] => Err(format!("no direction in {:?}", segment.trim())),
        _ => Err("ambiguous direction".to_string()),
    }
}

fn parse_confidence(segment: &str) -> Result<f64, String> {
    let cleaned = segment.trim().trim_end_matches('%').trim();
    let value: f64 = cleaned
        .parse()
        .map_err(|_| format!("invalid confidence {:?}", segment.trim()))?;

    if !value.is_finite() {
        return Err(format!("non-finite confidence {:?}", segment.trim()));
    }

    // Values above 1 are read as percentages.
    let scaled = if value > 1.0 { value / 100.0 } else { value };
    Ok(scaled.clamp(0.0, 1.0))
}

fn snippet(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= SNIPPET_CHARS {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(SNIPPET_CHARS).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_response() {
        let signal = parse_signal("bullish|0.85|Revenue grew 24% with expanding margins.");
        assert_eq!(signal.direction, Direction::Bullish);
        assert!((signal.confidence - 0.85).abs() < 1e-9);
        assert_eq!(signal.reasoning, "Revenue grew 24% with expanding margins.");
    }

    #[test]
    fn test_whitespace_and_case_tolerance() {
        let signal = parse_signal("  BEARISH | 0.7 |  Debt load is rising.  ");
        assert_eq!(signal.direction, Direction::Bearish);
        assert!((signal.confidence - 0.7).abs() < 1e-9);
        assert_eq!(signal.reasoning, "Debt load is rising.");
    }

    #[test]
    fn test_percentage_confidence() {
        let signal = parse_signal("neutral|62|Mixed indicators across the board.");
        assert!((signal.confidence - 0.62).abs() < 1e-9);

        let signal = parse_signal("bullish|85%|Strong quarter, 12% beat.");
        assert!((signal.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_labelled_direction_segment() {
        let signal = parse_signal("Direction: bullish|0.8|PE of 12 is cheap for the sector.");
        assert_eq!(signal.direction, Direction::Bullish);
        assert!((signal.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_is_stable() {
        let raw = "bearish|0.66|Margins compressed 3 quarters in a row.";
        let first = parse_signal(raw);
        let second = parse_signal(raw);
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_degrades_to_neutral() {
        for raw in [
            "",
            "I think the stock will go up",
            "bullish|high|great quarter",
            "sideways|0.5|unclear",
            "bullish|0.8|",
            "bullish|0.8",
        ] {
            let signal = parse_signal(raw);
            assert_eq!(signal.direction, Direction::Neutral, "input {:?}", raw);
            assert_eq!(signal.confidence, 0.5);
            assert!(
                signal.reasoning.contains("unparseable"),
                "reasoning {:?}",
                signal.reasoning
            );
        }
    }

    #[test]
    fn test_ambiguous_direction_degrades() {
        let signal = parse_signal("bullish or bearish|0.9|could go either way");
        assert_eq!(signal.direction, Direction::Neutral);
        assert!(signal.reasoning.contains("ambiguous"));
    }

    #[test]
    fn test_out_of_range_confidence_clamped() {
        let signal = parse_signal("bullish|250|Absurdly confident, 250 percent.");
        assert_eq!(signal.confidence, 1.0);

        let signal = parse_signal("bearish|-0.4|Negative confidence makes no sense.");
        assert_eq!(signal.confidence, 0.0);
    }

    #[test]
    fn test_extra_pipes_stay_in_reasoning() {
        let signal = parse_signal("neutral|0.5|Flat revenue | flat margins | no catalyst.");
        assert_eq!(signal.direction, Direction::Neutral);
        assert_eq!(signal.reasoning, "Flat revenue | flat margins | no catalyst.");
    }

    #[test]
    fn test_diagnostic_snippet_is_bounded() {
        let long = format!("garbage {}", "x".repeat(500));
        let signal = parse_signal(&long);
        assert!(signal.reasoning.chars().count() < 200);
    }
}
