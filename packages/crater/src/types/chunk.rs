//! Chunk types - retrieval units cut from reference documents.

use serde::{Deserialize, Serialize};

/// A bounded-length text segment cut from a reference document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text (trimmed)
    pub text: String,

    /// File name of the source document
    pub source_id: String,

    /// Character offset of the chunk within the loaded document text
    pub start_offset: usize,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(text: impl Into<String>, source_id: impl Into<String>, start_offset: usize) -> Self {
        Self {
            text: text.into(),
            source_id: source_id.into(),
            start_offset,
        }
    }
}

/// A chunk returned from the index together with its similarity score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    /// The retrieved chunk
    pub chunk: Chunk,

    /// Cosine similarity to the query (higher is closer)
    pub score: f32,
}
