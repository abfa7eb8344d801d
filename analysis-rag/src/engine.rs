use crate::chunker::chunk_document;
use crate::embedder::Embedder;
use crate::store::{ChunkStore, ScoredChunk};
use analysis_core::{RagConfig, RagError};
use moka::future::Cache;
use std::sync::Arc;

/// Query embeddings worth keeping around; the synthesis stage re-issues a
/// small fixed query set per document.
const QUERY_CACHE_CAPACITY: u64 = 64;

/// Document ingestion and retrieval over an injected embedder.
///
/// The store is populated by `ingest` before any query is issued (caller
/// lifecycle) and is read-only afterwards until an explicit `clear`.
pub struct RagEngine {
    embedder: Arc<dyn Embedder>,
    config: RagConfig,
    store: ChunkStore,
    query_cache: Cache<String, Vec<f32>>,
}

impl RagEngine {
    pub fn new(embedder: Arc<dyn Embedder>, config: RagConfig) -> Self {
        tracing::info!(
            "Initializing RAG engine: embedder={}, chunk_size={}, chunk_overlap={}, top_k={}",
            embedder.name(),
            config.chunk_size,
            config.chunk_overlap,
            config.top_k
        );

        Self {
            embedder,
            config,
            store: ChunkStore::new(),
            query_cache: Cache::new(QUERY_CACHE_CAPACITY),
        }
    }

    /// Whether at least one document has been ingested.
    pub fn is_ready(&self) -> bool {
        !self.store.is_empty()
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Chunk and embed a document, appending it to the store.
    ///
    /// Returns the number of chunks ingested. Chunk indices are contiguous
    /// from 0 and embeddings are computed exactly once here.
    pub async fn ingest(&mut self, doc_id: &str, text: &str) -> Result<usize, RagError> {
        let mut chunks = chunk_document(
            doc_id,
            text,
            self.config.chunk_size,
            self.config.chunk_overlap,
        )?;

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed(texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(RagError::Embedding(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = Some(embedding);
        }

        let count = chunks.len();
        self.store.insert(chunks);

        tracing::info!("Ingested document {}: {} chunks embedded", doc_id, count);

        Ok(count)
    }

    /// Retrieve the `top_k` most relevant chunks for a query.
    ///
    /// The query is embedded once (cached by query text) and scored against
    /// every stored chunk. An empty store yields an empty result rather
    /// than an error, so querying before ingestion stays recoverable.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredChunk>, RagError> {
        if self.store.is_empty() {
            tracing::debug!("Retrieval requested before ingestion; returning no chunks");
            return Ok(Vec::new());
        }

        let embedding = match self.query_cache.get(query).await {
            Some(cached) => cached,
            None => {
                let mut embeddings = self.embedder.embed(vec![query.to_string()]).await?;
                let embedding = embeddings.pop().ok_or_else(|| {
                    RagError::Embedding("embedder returned no vector for query".to_string())
                })?;
                self.query_cache
                    .insert(query.to_string(), embedding.clone())
                    .await;
                embedding
            }
        };

        let results = self.store.search(&embedding, self.config.top_k);

        tracing::debug!(
            "Retrieved {} chunks for query (top_k={}, store={})",
            results.len(),
            self.config.top_k,
            self.store.len()
        );

        Ok(results)
    }

    /// Drop all ingested chunks and cached query embeddings.
    pub fn clear(&mut self) {
        self.store.clear();
        self.query_cache.invalidate_all();
        tracing::info!("RAG engine cleared");
    }
}
