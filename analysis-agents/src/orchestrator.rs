//! Concurrent fan-out over agents and tickers.
//!
//! Every function here preserves request order: result *i* always
//! corresponds to input *i*, regardless of completion order. Per-item
//! failures stay in their slot as `Err` entries instead of aborting the
//! batch.

use crate::agent::hybrid_agent::combine_signals;
use crate::agent::Agent;
use analysis_core::{AnalysisInput, Direction, PipelineError, Signal};
use futures::future::join_all;
use std::sync::Arc;

/// Fan one agent out over many inputs concurrently.
pub async fn analyze_tickers(
    agent: Arc<dyn Agent>,
    inputs: &[AnalysisInput],
) -> Vec<Result<Signal, PipelineError>> {
    tracing::debug!(
        "Fanning agent {} out over {} inputs",
        agent.name(),
        inputs.len()
    );

    join_all(inputs.iter().map(|input| {
        let agent = agent.clone();
        async move { agent.analyze(input).await }
    }))
    .await
}

/// Fan many agents out over one input concurrently.
pub async fn analyze_with_agents(
    agents: &[Arc<dyn Agent>],
    input: &AnalysisInput,
) -> Vec<Result<Signal, PipelineError>> {
    tracing::debug!(
        "Fanning {} agents out over {}",
        agents.len(),
        input.ticker()
    );

    join_all(agents.iter().map(|agent| agent.analyze(input))).await
}

/// Two-stage batch pipeline: the cheap filter runs across the whole input
/// set first, and only inputs it triggers on escalate to the expensive
/// stage. Escalated results are merged with their filter signal by
/// consensus; everything else keeps the filter's result.
pub async fn run_pipeline(
    filter: Arc<dyn Agent>,
    escalation: Arc<dyn Agent>,
    inputs: &[AnalysisInput],
) -> Vec<Result<Signal, PipelineError>> {
    // Stage 1: screen everything with the cheap filter.
    let mut results = analyze_tickers(filter, inputs).await;

    let triggered: Vec<usize> = results
        .iter()
        .enumerate()
        .filter_map(|(index, gate)| match gate {
            Ok(signal) if signal.direction != Direction::Neutral => Some(index),
            _ => None,
        })
        .collect();

    tracing::info!(
        "Pipeline stage 1 complete: {}/{} inputs escalate",
        triggered.len(),
        inputs.len()
    );

    if triggered.is_empty() {
        return results;
    }

    // Stage 2: escalate only the triggered subset, concurrently.
    let deep = join_all(
        triggered
            .iter()
            .map(|&index| escalation.analyze(&inputs[index])),
    )
    .await;

    for (&index, deep_result) in triggered.iter().zip(deep) {
        let gate = match &results[index] {
            Ok(signal) => signal.clone(),
            Err(_) => continue,
        };
        results[index] = match deep_result {
            Ok(deep_signal) => combine_signals(&gate, &deep_signal),
            Err(e) => Err(e),
        };
    }

    results
}
