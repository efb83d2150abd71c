//! Testing utilities including mock capabilities.
//!
//! These let applications (and this crate's own tests) drive the pipeline
//! without a running embedding or generation model.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, RwLock};

use crate::error::{CraterError, Result};
use crate::traits::{Embedder, TextGenerator};

/// A deterministic embedder.
///
/// Unknown texts get a vector derived from their SHA-256 digest, so equal
/// texts always embed identically. Every call is recorded.
#[derive(Clone, Default)]
pub struct MockEmbedder {
    /// Predefined embeddings by text
    embeddings: Arc<RwLock<HashMap<String, Vec<f32>>>>,

    /// Texts whose embedding fails
    failures: Arc<RwLock<HashSet<String>>>,

    /// Dimension of generated embeddings
    dimension: usize,

    /// Embedded texts, in call order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockEmbedder {
    /// Create a mock embedder producing 32-dimensional vectors.
    pub fn new() -> Self {
        Self {
            dimension: 32,
            ..Default::default()
        }
    }

    /// Set the dimension of generated embeddings.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Add a predefined embedding for text.
    pub fn with_embedding(self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        self.embeddings
            .write()
            .unwrap()
            .insert(text.into(), embedding);
        self
    }

    /// Make embedding `text` fail.
    pub fn failing_on(self, text: impl Into<String>) -> Self {
        self.failures.write().unwrap().insert(text.into());
        self
    }

    /// Texts embedded so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    /// Number of embed calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    fn deterministic_embedding(&self, text: &str) -> Vec<f32> {
        use sha2::{Digest, Sha256};

        let hash = Sha256::digest(text.as_bytes());
        (0..self.dimension)
            .map(|i| (hash[i % 32] as f32 / 127.5) - 1.0)
            .collect()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    fn model_id(&self) -> &str {
        "mock-embedder"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.write().unwrap().push(text.to_string());

        if self.failures.read().unwrap().contains(text) {
            return Err(CraterError::Embedding("mock embedding failure".into()));
        }

        if let Some(embedding) = self.embeddings.read().unwrap().get(text) {
            return Ok(embedding.clone());
        }

        Ok(self.deterministic_embedding(text))
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail(String),
}

/// A generator that replies with canned text.
///
/// Queued replies are consumed first, in order; after that every call gets
/// the default response. Prompts are recorded for assertions.
#[derive(Clone, Default)]
pub struct MockGenerator {
    queued: Arc<RwLock<VecDeque<MockReply>>>,
    default_response: String,
    prompts: Arc<RwLock<Vec<String>>>,
}

impl MockGenerator {
    /// Create a generator whose default response is empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response returned once the queue is exhausted.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Queue a successful reply.
    pub fn then_reply(self, response: impl Into<String>) -> Self {
        self.queued
            .write()
            .unwrap()
            .push_back(MockReply::Text(response.into()));
        self
    }

    /// Queue a failing call.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.queued
            .write()
            .unwrap()
            .push_back(MockReply::Fail(message.into()));
        self
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }

    /// Number of complete calls so far.
    pub fn call_count(&self) -> usize {
        self.prompts.read().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn model_id(&self) -> &str {
        "mock-generator"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.write().unwrap().push(prompt.to_string());

        match self.queued.write().unwrap().pop_front() {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Fail(message)) => Err(CraterError::Generation(message.into())),
            None => Ok(self.default_response.clone()),
        }
    }
}

/// Wrap a JSON payload the way chat models commonly do: a fence line above
/// and below.
pub fn fenced(json: &str) -> String {
    format!("```json\n{json}\n```")
}

/// A minimal RO-Crate document describing `files` under a root dataset.
pub fn sample_crate_json(files: &[&str]) -> String {
    let parts: Vec<serde_json::Value> = files
        .iter()
        .map(|f| serde_json::json!({"@id": f}))
        .collect();

    let mut graph = vec![
        serde_json::json!({
            "@id": "ro-crate-metadata.json",
            "@type": "CreativeWork",
            "conformsTo": {"@id": "https://w3id.org/ro/crate/1.1"},
            "about": {"@id": "./"}
        }),
        serde_json::json!({
            "@id": "./",
            "@type": "Dataset",
            "name": "Sample",
            "hasPart": parts
        }),
    ];
    graph.extend(
        files
            .iter()
            .map(|f| serde_json::json!({"@id": f, "@type": "File", "name": f})),
    );

    let document = serde_json::json!({
        "@context": "https://w3id.org/ro/crate/1.1/context",
        "@graph": graph
    });
    serde_json::to_string_pretty(&document).unwrap_or_default()
}
