use crate::chunker::DocumentChunk;
use serde::{Deserialize, Serialize};

/// A chunk paired with its query-time relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// In-memory chunk store.
///
/// Built once during ingestion and read-only afterwards, so concurrent
/// queries need no synchronization; mutation is limited to `insert` during
/// ingestion and an explicit `clear`.
#[derive(Debug, Default)]
pub struct ChunkStore {
    chunks: Vec<DocumentChunk>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document's chunks. Called once per ingested document.
    pub fn insert(&mut self, chunks: Vec<DocumentChunk>) {
        self.chunks.extend(chunks);
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Drop every stored chunk and embedding.
    pub fn clear(&mut self) {
        self.chunks.clear();
    }

    /// Score every embedded chunk against the query vector by cosine
    /// similarity and return the `top_k` best, ties broken by lower chunk
    /// index. Deterministic for identical inputs.
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let embedding = chunk.embedding.as_ref()?;
                Some(ScoredChunk {
                    chunk: chunk.clone(),
                    score: cosine_similarity(query, embedding),
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.chunk.index.cmp(&b.chunk.index))
        });
        scored.truncate(top_k);

        scored
    }
}

/// Cosine similarity of two vectors; 0.0 for mismatched or zero-norm input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
