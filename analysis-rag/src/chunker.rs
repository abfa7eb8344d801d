use analysis_core::RagError;
use serde::{Deserialize, Serialize};

/// A bounded slice of document text, the unit of retrieval.
///
/// Chunks are created once at ingestion and read-only afterwards: the
/// embedding starts out empty and is filled exactly once when the injected
/// embedder runs over the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub doc_id: String,
    /// Contiguous position within the document, starting at 0.
    pub index: usize,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// Split a document into overlapping chunks.
///
/// Chunk *i* covers characters
/// `[i * (chunk_size - chunk_overlap), i * (chunk_size - chunk_overlap) + chunk_size)`;
/// the final chunk may be shorter. Consecutive chunks share exactly
/// `chunk_overlap` characters, so the chunks form a lossless cover of the
/// document.
pub fn chunk_document(
    doc_id: &str,
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<DocumentChunk>, RagError> {
    if chunk_size == 0 {
        return Err(RagError::InvalidChunking(
            "chunk_size must be greater than 0".to_string(),
        ));
    }
    if chunk_overlap >= chunk_size {
        return Err(RagError::InvalidChunking(format!(
            "chunk_overlap {} must be smaller than chunk_size {}",
            chunk_overlap, chunk_size
        )));
    }
    if text.is_empty() {
        return Err(RagError::EmptyDocument(doc_id.to_string()));
    }

    // Offsets are in characters, not bytes, so multi-byte text chunks cleanly.
    let chars: Vec<char> = text.chars().collect();
    let stride = chunk_size - chunk_overlap;

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(DocumentChunk {
            doc_id: doc_id.to_string(),
            index: chunks.len(),
            text: chars[start..end].iter().collect(),
            embedding: None,
        });

        if end == chars.len() {
            break;
        }
        start += stride;
    }

    tracing::debug!(
        "Chunked document {} into {} chunks (size={}, overlap={})",
        doc_id,
        chunks.len(),
        chunk_size,
        chunk_overlap
    );

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_offsets_scenario() {
        // 1000 chars at size 300 / overlap 50: chunks start at 0, 250, 500, 750.
        let text = "a".repeat(1000);
        let chunks = chunk_document("doc", &text, 300, 50).unwrap();

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].text.len(), 300);
        assert_eq!(chunks[1].text.len(), 300);
        assert_eq!(chunks[2].text.len(), 300);
        assert_eq!(chunks[3].text.len(), 250);
    }

    #[test]
    fn test_chunk_indices_contiguous() {
        let text = "x".repeat(1234);
        let chunks = chunk_document("doc", &text, 200, 40).unwrap();
        for (expected, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, expected);
        }
    }

    #[test]
    fn test_consecutive_chunks_share_overlap() {
        let text: String = ('a'..='z').cycle().take(600).collect();
        let chunks = chunk_document("doc", &text, 100, 25).unwrap();

        for pair in chunks.windows(2) {
            let head: String = pair[0].text.chars().skip(100 - 25).collect();
            let tail: String = pair[1].text.chars().take(25).collect();
            assert_eq!(head, tail);
        }
    }

    #[test]
    fn test_lossless_reconstruction() {
        let text: String = ('a'..='z').cycle().take(953).collect();
        let chunks = chunk_document("doc", &text, 120, 30).unwrap();

        let mut rebuilt = chunks[0].text.clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.text.chars().skip(30));
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_short_document_single_chunk() {
        let chunks = chunk_document("doc", "short text", 300, 50).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short text");
    }

    #[test]
    fn test_empty_document_rejected() {
        let err = chunk_document("doc", "", 300, 50).unwrap_err();
        assert!(matches!(err, RagError::EmptyDocument(_)));
    }

    #[test]
    fn test_invalid_chunking_config_rejected() {
        assert!(matches!(
            chunk_document("doc", "text", 0, 0),
            Err(RagError::InvalidChunking(_))
        ));
        assert!(matches!(
            chunk_document("doc", "text", 50, 50),
            Err(RagError::InvalidChunking(_))
        ));
        assert!(matches!(
            chunk_document("doc", "text", 50, 80),
            Err(RagError::InvalidChunking(_))
        ));
    }

    #[test]
    fn test_multibyte_text_chunks_on_char_boundaries() {
        let text: String = "αβγδε".chars().cycle().take(500).collect();
        let chunks = chunk_document("doc", &text, 120, 20).unwrap();
        assert!(chunks.len() > 1);
        assert_eq!(chunks[0].text.chars().count(), 120);
    }
}
