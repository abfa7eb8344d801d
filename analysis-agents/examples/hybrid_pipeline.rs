/// Hybrid Pipeline Usage Example
///
/// This example demonstrates how to:
/// 1. Define threshold rules for the cheap filter stage
/// 2. Initialize the LLM client over a provider adapter
/// 3. Compose a hybrid agent (rule filter + LLM escalation)
/// 4. Fan the pipeline out over a batch of tickers
///
/// It runs against a scripted in-process provider so it works offline;
/// swap in `OpenAiProvider::new(api_key)` or `OllamaProvider::default()`
/// for real analysis.
use analysis_agents::{
    run_pipeline, Agent, ChatParams, ChatProvider, LlmAgent, LlmClient, RuleBasedAgent,
};
use analysis_core::{
    AnalysisInput, Direction, LlmClientConfig, LlmError, MetricRecord, Operator, Rule, RuleAction,
    RuleCondition, ScoreCard, ScoreCriterion,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Offline stand-in for a real provider; answers every prompt with a
/// fixed, well-formed signal line.
struct ScriptedProvider;

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, _prompt: &str, _params: &ChatParams) -> Result<String, LlmError> {
        Ok(
            "bullish|0.82|Revenue growth of 19% with a PE near 11 leaves room for multiple expansion."
                .to_string(),
        )
    }
}

fn build_filter() -> anyhow::Result<RuleBasedAgent> {
    // First-match-wins rule order: the most aggressive screen comes first.
    let rules = vec![
        Rule::simple(
            "deep value",
            RuleCondition::new("pe_ratio", Operator::Lt, 10.0),
            RuleAction::new(Direction::Bullish, 0.9),
        )?,
        Rule::simple(
            "value",
            RuleCondition::new("pe_ratio", Operator::Lt, 15.0),
            RuleAction::new(Direction::Bullish, 0.7),
        )?,
        Rule::simple(
            "overleveraged",
            RuleCondition::new("debt_to_equity", Operator::Gt, 2.5),
            RuleAction::new(Direction::Bearish, 0.8),
        )?,
    ];

    // Fallback scoring across growth and quality metrics.
    let score_card = ScoreCard::new(
        vec![
            ScoreCriterion::new("revenue_growth", Operator::Gt, 0.15, 3.0),
            ScoreCriterion::new("roe", Operator::Gt, 0.20, 2.0),
            ScoreCriterion::new("dividend_yield", Operator::Gt, 0.03, 1.0),
        ],
        4.0,
        -2.0,
    )?;

    Ok(RuleBasedAgent::new("fundamental-filter", rules).with_score_card(score_card))
}

fn sample_batch() -> Vec<AnalysisInput> {
    vec![
        AnalysisInput::new(
            MetricRecord::new("CHEAPCO")
                .with_metric("pe_ratio", 8.5)
                .with_metric("revenue_growth", 0.19)
                .with_metric("roe", 0.24),
        ),
        AnalysisInput::new(
            MetricRecord::new("FAIRCO")
                .with_metric("pe_ratio", 22.0)
                .with_metric("revenue_growth", 0.05)
                .with_metric("roe", 0.11),
        ),
        AnalysisInput::new(
            MetricRecord::new("DEBTCO")
                .with_metric("pe_ratio", 18.0)
                .with_metric("debt_to_equity", 3.4),
        ),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let filter = Arc::new(build_filter()?);

    let llm_config = LlmClientConfig {
        model: "gpt-4-turbo".to_string(),
        temperature: 0.1,
        max_tokens: 500,
        max_retries: 3,
        ..Default::default()
    };
    let client = LlmClient::new(llm_config, Arc::new(ScriptedProvider))?;
    let escalation: Arc<dyn Agent> = Arc::new(LlmAgent::new("llm-analyst", client));

    let batch = sample_batch();
    println!("Running hybrid pipeline over {} tickers...\n", batch.len());

    let results = run_pipeline(filter, escalation, &batch).await;

    for (input, result) in batch.iter().zip(results) {
        match result {
            Ok(signal) => {
                println!("{}:", input.ticker());
                println!("  direction:  {}", signal.direction);
                println!("  confidence: {:.2}", signal.confidence);
                println!("  reasoning:  {}\n", signal.reasoning);
            }
            Err(e) => println!("{}: analysis failed: {}\n", input.ticker(), e),
        }
    }

    Ok(())
}
