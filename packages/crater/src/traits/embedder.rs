//! Embedding capability.

use async_trait::async_trait;

use crate::error::Result;

/// Turns text into a dense vector for similarity search.
///
/// Implementations wrap a concrete embedding model (Ollama, a hosted API, or a
/// deterministic stub in tests). Vectors returned by one implementation must
/// all have the same dimension.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Identifier of the embedding model, used to key persisted indexes.
    fn model_id(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
