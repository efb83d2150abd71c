//! Ollama API request and response types.

use serde::{Deserialize, Serialize};

// =============================================================================
// Embeddings
// =============================================================================

/// Embedding request for `/api/embeddings`.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRequest {
    pub model: String,
    pub prompt: String,
}

/// Embedding response.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingResponse {
    #[serde(default)]
    pub embedding: Vec<f32>,
}

// =============================================================================
// Generation
// =============================================================================

/// Non-streaming generation request for `/api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    /// Model to use (e.g., "gemma3:12b")
    pub model: String,

    /// Full prompt text
    pub prompt: String,

    /// Always false; this client reads a single response object
    pub stream: bool,

    /// Sampling options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
}

impl GenerateRequest {
    /// Create a non-streaming request.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: false,
            options: None,
        }
    }

    /// Set sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerateOptions {
            temperature: Some(temperature),
        });
        self
    }
}

/// Model options.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Generation response.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub model: Option<String>,
    pub response: String,
    #[serde(default)]
    pub done: bool,
    /// Total time spent generating, in nanoseconds
    pub total_duration: Option<u64>,
    pub eval_count: Option<u32>,
}
