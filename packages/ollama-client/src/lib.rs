//! Pure Ollama REST API client
//!
//! A minimal client for a local Ollama server with no domain-specific logic.
//! Supports embeddings and non-streaming text generation.
//!
//! # Example
//!
//! ```rust,ignore
//! use ollama_client::{GenerateRequest, OllamaClient};
//!
//! let client = OllamaClient::new();
//!
//! let embedding = client.create_embedding("text to embed", "nomic-embed-text:v1.5").await?;
//!
//! let response = client
//!     .generate(GenerateRequest::new("gemma3:12b", "Hello!").temperature(0.0))
//!     .await?;
//! println!("{}", response.response);
//! ```

pub mod error;
pub mod types;

pub use error::{OllamaError, Result};
pub use types::*;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Default address of a local Ollama server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Pure Ollama API client.
#[derive(Clone)]
pub struct OllamaClient {
    http_client: Client,
    base_url: String,
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaClient {
    /// Create a client for the local server.
    pub fn new() -> Self {
        Self {
            http_client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set a custom base URL (remote host, proxy, test server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create an embedding for text.
    pub async fn create_embedding(&self, text: &str, model: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: model.to_string(),
            prompt: text.to_string(),
        };

        let response = self
            .http_client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Embedding request failed");
                OllamaError::Network(e.to_string())
            })?;

        let embed_response: EmbeddingResponse = read_json(response, "embedding").await?;
        if embed_response.embedding.is_empty() {
            return Err(OllamaError::Parse(format!(
                "empty embedding from model {model}"
            )));
        }

        debug!(model, dimension = embed_response.embedding.len(), "Embedding created");
        Ok(embed_response.embedding)
    }

    /// Run a non-streaming generation.
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        debug!(model = %request.model, prompt_len = request.prompt.len(), "Sending generate request");

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Generate request failed");
                OllamaError::Network(e.to_string())
            })?;

        let generated: GenerateResponse = read_json(response, "generate").await?;
        debug!(
            model = %request.model,
            eval_count = generated.eval_count.unwrap_or(0),
            total_ms = generated.total_duration.unwrap_or(0) / 1_000_000,
            "Generation complete"
        );
        Ok(generated)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, operation: &'static str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        warn!(operation, status = status.as_u16(), error = %message, "Ollama error");
        return Err(OllamaError::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| OllamaError::Parse(e.to_string()))
}
