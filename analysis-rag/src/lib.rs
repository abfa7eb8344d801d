pub mod chunker;
pub mod embedder;
pub mod engine;
pub mod store;

// Re-export commonly used items
pub use chunker::{chunk_document, DocumentChunk};
pub use embedder::{Embedder, FastembedEmbedder};
pub use engine::RagEngine;
pub use store::{ChunkStore, ScoredChunk};
