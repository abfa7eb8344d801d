use crate::agent::Agent;
use crate::llm::{parse_signal, LlmClient, PromptFormatter};
use analysis_core::confidence::llm_confidence_adjustment;
use analysis_core::{AgentConfig, AnalysisInput, PipelineError, Signal};
use async_trait::async_trait;

/// LLM-powered agent: formats the fundamentals into a prompt, asks the
/// model for a `direction|confidence|reasoning` answer, and discounts the
/// self-reported confidence when the reasoning is thin.
///
/// A malformed response degrades to a diagnostic neutral signal; only
/// systemic client failures (auth, retry exhaustion) propagate as errors.
pub struct LlmAgent {
    name: String,
    client: LlmClient,
}

impl LlmAgent {
    pub fn new(name: impl Into<String>, client: LlmClient) -> Self {
        Self {
            name: name.into(),
            client,
        }
    }

    /// Build the agent from an [`AgentConfig`]; the client is only
    /// constructed because the config carries an `llm` section.
    pub fn from_config(
        name: impl Into<String>,
        config: &AgentConfig,
        api_key: Option<String>,
    ) -> Result<Self, PipelineError> {
        let llm = config.llm.clone().ok_or_else(|| {
            PipelineError::Validation("agent config has no llm section".to_string())
        })?;

        Ok(Self::new(name, LlmClient::from_config(llm, api_key)?))
    }

    pub fn client(&self) -> &LlmClient {
        &self.client
    }
}

#[async_trait]
impl Agent for LlmAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn analyze(&self, input: &AnalysisInput) -> Result<Signal, PipelineError> {
        let prompt = PromptFormatter::fundamentals(&input.record);
        let response = self.client.chat(&prompt).await?;

        let parsed = parse_signal(&response);
        let adjusted = llm_confidence_adjustment(parsed.confidence, &parsed.reasoning);

        tracing::info!(
            "Agent {} analyzed {}: direction={}, confidence={:.2} (reported {:.2})",
            self.name,
            input.ticker(),
            parsed.direction,
            adjusted,
            parsed.confidence
        );

        Signal::new(parsed.direction, adjusted, parsed.reasoning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatParams, ChatProvider};
    use analysis_core::{Direction, LlmClientConfig, LlmError, MetricRecord};
    use std::sync::Arc;

    struct ScriptedProvider {
        response: String,
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(&self, _prompt: &str, _params: &ChatParams) -> Result<String, LlmError> {
            Ok(self.response.clone())
        }
    }

    fn agent_with_response(response: &str) -> LlmAgent {
        let client = LlmClient::new(
            LlmClientConfig::default(),
            Arc::new(ScriptedProvider {
                response: response.to_string(),
            }),
        )
        .unwrap();
        LlmAgent::new("llm", client)
    }

    fn input() -> AnalysisInput {
        AnalysisInput::new(MetricRecord::new("AAPL").with_metric("pe_ratio", 14.9))
    }

    #[tokio::test]
    async fn test_well_formed_response_becomes_signal() {
        let agent = agent_with_response(
            "bullish|0.9|Revenue grew 24% and PE of 14.9 sits below the sector median.",
        );

        let signal = agent.analyze(&input()).await.unwrap();
        assert_eq!(signal.direction, Direction::Bullish);
        // Detailed, figure-bearing reasoning keeps the reported confidence.
        assert!((signal.confidence - 0.9).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_thin_reasoning_is_discounted() {
        let agent = agent_with_response("bullish|0.9|Looks strong");

        let signal = agent.analyze(&input()).await.unwrap();
        assert!(signal.confidence < 0.9);
    }

    #[tokio::test]
    async fn test_malformed_response_degrades_not_errors() {
        let agent = agent_with_response("I am not sure what to say about this company.");

        let signal = agent.analyze(&input()).await.unwrap();
        assert_eq!(signal.direction, Direction::Neutral);
        assert!(signal.reasoning.contains("unparseable"));
    }

    #[test]
    fn test_from_config_requires_llm_section() {
        use analysis_core::AgentConfig;

        let bare = AgentConfig::default();
        assert!(LlmAgent::from_config("llm", &bare, None).is_err());

        let configured = AgentConfig::default().with_llm(LlmClientConfig::default());
        assert!(LlmAgent::from_config("llm", &configured, Some("sk-test".to_string())).is_ok());
    }

    #[tokio::test]
    async fn test_auth_failure_propagates() {
        struct AuthProvider;

        #[async_trait]
        impl ChatProvider for AuthProvider {
            fn name(&self) -> &str {
                "auth"
            }

            async fn chat(&self, _prompt: &str, _params: &ChatParams) -> Result<String, LlmError> {
                Err(LlmError::Auth("bad key".to_string()))
            }
        }

        let client = LlmClient::new(LlmClientConfig::default(), Arc::new(AuthProvider)).unwrap();
        let agent = LlmAgent::new("llm", client);

        let err = agent.analyze(&input()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Llm(LlmError::Auth(_))));
    }
}
