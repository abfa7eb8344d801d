use crate::agent::Agent;
use crate::llm::{parse_signal, LlmClient, PromptFormatter};
use analysis_core::confidence::llm_confidence_adjustment;
use analysis_core::{AgentConfig, AnalysisInput, PipelineError, RagSignal, Signal};
use analysis_rag::{Embedder, RagEngine};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Analytical queries run against every ingested document during
/// synthesis.
pub const ANALYSIS_QUERIES: [&str; 3] = [
    "financial performance and profitability",
    "risk factors and challenges",
    "growth strategy and outlook",
];

/// Insights are bounded so a rambling model cannot bloat the result.
const MAX_INSIGHT_CHARS: usize = 400;

/// Retrieval-augmented document agent.
///
/// A document attached to the input is ingested first (chunked and
/// embedded); synthesis then retrieves context for a fixed set of
/// analytical queries, asks the LLM for one bounded insight per query, and
/// derives an overall signal from the combined insights. Querying with no
/// document ingested yields a neutral "no document" result rather than an
/// error.
pub struct RagAgent {
    name: String,
    engine: RwLock<RagEngine>,
    client: LlmClient,
}

impl RagAgent {
    pub fn new(name: impl Into<String>, engine: RagEngine, client: LlmClient) -> Self {
        Self {
            name: name.into(),
            engine: RwLock::new(engine),
            client,
        }
    }

    /// Build the agent from an [`AgentConfig`] and an injected embedder.
    /// Both the `rag` and `llm` sections must be present.
    pub fn from_config(
        name: impl Into<String>,
        config: &AgentConfig,
        embedder: Arc<dyn Embedder>,
        api_key: Option<String>,
    ) -> Result<Self, PipelineError> {
        let rag = config.rag.ok_or_else(|| {
            PipelineError::Validation("agent config has no rag section".to_string())
        })?;
        let llm = config.llm.clone().ok_or_else(|| {
            PipelineError::Validation("agent config has no llm section".to_string())
        })?;

        Ok(Self::new(
            name,
            RagEngine::new(embedder, rag),
            LlmClient::from_config(llm, api_key)?,
        ))
    }

    /// Full document analysis, returning the insights alongside the
    /// signal.
    pub async fn analyze_document(
        &self,
        input: &AnalysisInput,
    ) -> Result<RagSignal, PipelineError> {
        if let Some(document) = &input.document {
            let mut engine = self.engine.write().await;
            engine.ingest(input.ticker(), document).await?;
        }

        let engine = self.engine.read().await;
        if !engine.is_ready() {
            tracing::debug!(
                "Agent {} has no document for {}; returning neutral",
                self.name,
                input.ticker()
            );
            return Ok(RagSignal::neutral(format!(
                "no document ingested for {}",
                input.ticker()
            )));
        }

        let mut insights = Vec::new();
        for query in ANALYSIS_QUERIES {
            let context = engine.retrieve(query).await?;
            if context.is_empty() {
                continue;
            }

            let prompt = PromptFormatter::document_insight(query, &context);
            let response = self.client.chat(&prompt).await?;
            insights.push(format!("{}: {}", query, truncate(response.trim())));
        }

        let prompt = PromptFormatter::document_overall(input.ticker(), &insights);
        let response = self.client.chat(&prompt).await?;

        let parsed = parse_signal(&response);
        let adjusted = llm_confidence_adjustment(parsed.confidence, &parsed.reasoning);
        let signal = Signal::new(parsed.direction, adjusted, parsed.reasoning)?;

        tracing::info!(
            "Agent {} synthesized {} insights for {}: direction={}, confidence={:.2}",
            self.name,
            insights.len(),
            input.ticker(),
            signal.direction,
            signal.confidence
        );

        Ok(RagSignal { signal, insights })
    }

    /// Drop all ingested documents.
    pub async fn clear(&self) {
        self.engine.write().await.clear();
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_INSIGHT_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX_INSIGHT_CHARS).collect();
        format!("{}...", head)
    }
}

#[async_trait]
impl Agent for RagAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn analyze(&self, input: &AnalysisInput) -> Result<Signal, PipelineError> {
        Ok(self.analyze_document(input).await?.signal)
    }
}
