use analysis_core::RagError;
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

/// Injected embedding capability.
///
/// The engine never depends on a concrete model: anything that can turn a
/// batch of texts into vectors of a consistent dimension works. Failures
/// surface as [`RagError::Embedding`], never as an LLM error.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embedding model name (e.g., "bge-small-en-v1.5").
    fn name(&self) -> &str;

    /// Embed a batch of texts, one vector per input in the same order.
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, RagError>;
}

/// Local fastembed-backed embedder (BGE-small-en-v1.5, 384 dimensions).
pub struct FastembedEmbedder {
    model: TextEmbedding,
}

impl FastembedEmbedder {
    /// Load the embedding model (downloads the ONNX weights on first run).
    pub fn new() -> Result<Self, RagError> {
        tracing::info!("Loading embedding model (BGE-small-en-v1.5)...");

        let model = TextEmbedding::try_new(InitOptions::new(EmbeddingModel::BGESmallENV15))
            .map_err(|e| RagError::Embedding(format!("failed to load embedding model: {}", e)))?;

        tracing::info!("Embedding model loaded successfully");

        Ok(Self { model })
    }
}

#[async_trait]
impl Embedder for FastembedEmbedder {
    fn name(&self) -> &str {
        "bge-small-en-v1.5"
    }

    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let count = texts.len();
        let embeddings = self
            .model
            .embed(texts, None)
            .map_err(|e| RagError::Embedding(e.to_string()))?;

        tracing::debug!("Generated {} embeddings ({} requested)", embeddings.len(), count);

        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic embedder used across the workspace tests: hashes
    /// character counts into a tiny fixed-dimension vector.
    pub struct MockEmbedder;

    #[async_trait]
    impl Embedder for MockEmbedder {
        fn name(&self) -> &str {
            "mock"
        }

        async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, RagError> {
            Ok(texts
                .iter()
                .map(|text| {
                    let len = text.chars().count() as f32;
                    let vowels = text.chars().filter(|c| "aeiou".contains(*c)).count() as f32;
                    vec![len, vowels, 1.0]
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_mock_embedder_is_deterministic() {
        let embedder = MockEmbedder;
        let first = embedder.embed(vec!["hello world".to_string()]).await.unwrap();
        let second = embedder.embed(vec!["hello world".to_string()]).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_mock_embedder_batch_order() {
        let embedder = MockEmbedder;
        let embeddings = embedder
            .embed(vec!["a".to_string(), "abc".to_string()])
            .await
            .unwrap();
        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0][0], 1.0);
        assert_eq!(embeddings[1][0], 3.0);
    }
}
