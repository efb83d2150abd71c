//! Ollama implementations of the embedding and generation capabilities.
//!
//! # Example
//!
//! ```rust,ignore
//! use crater::ai::{OllamaEmbedder, OllamaGenerator};
//!
//! let embedder = OllamaEmbedder::new("nomic-embed-text:v1.5");
//! let generator = OllamaGenerator::new("gemma3:12b");
//! let pipeline = Pipeline::build(config, embedder, generator).await?;
//! ```

use async_trait::async_trait;
use ollama_client::{GenerateRequest, OllamaClient};

use crate::error::{CraterError, Result};
use crate::traits::{Embedder, TextGenerator};
use crate::types::CraterConfig;

/// Embeddings from an Ollama server.
#[derive(Clone)]
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
}

impl OllamaEmbedder {
    /// Embedder for `model` on the local server.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: OllamaClient::new(),
            model: model.into(),
        }
    }

    /// Embedder using the configured model and server.
    pub fn from_config(config: &CraterConfig) -> Self {
        Self::new(config.embedding_model.clone()).with_base_url(config.ollama_base_url.clone())
    }

    /// Set the server URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client
            .create_embedding(text, &self.model)
            .await
            .map_err(|e| CraterError::Embedding(Box::new(e)))
    }
}

/// Text generation from an Ollama server with temperature pinned to 0.
#[derive(Clone)]
pub struct OllamaGenerator {
    client: OllamaClient,
    model: String,
}

impl OllamaGenerator {
    /// Generator for `model` on the local server.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: OllamaClient::new(),
            model: model.into(),
        }
    }

    /// Generator using the configured model and server.
    pub fn from_config(config: &CraterConfig) -> Self {
        Self::new(config.generation_model.clone()).with_base_url(config.ollama_base_url.clone())
    }

    /// Set the server URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest::new(self.model.clone(), prompt).temperature(0.0);
        self.client
            .generate(request)
            .await
            .map(|r| r.response)
            .map_err(|e| CraterError::Generation(Box::new(e)))
    }
}
