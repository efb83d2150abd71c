//! Configuration for the synthesis pipeline.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CraterError, Result};

/// Configuration passed into every pipeline component at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CraterConfig {
    /// Embedding model identifier.
    ///
    /// Default: `nomic-embed-text:v1.5`.
    pub embedding_model: String,

    /// Generation model identifier.
    ///
    /// Default: `gemma3:12b`.
    pub generation_model: String,

    /// Maximum characters per reference chunk. Default: 500.
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks. Default: 100.
    pub chunk_overlap: usize,

    /// Chunks retrieved as grounding context per request. Default: 4.
    pub top_k: usize,

    /// Directory of reference documents (format specs, examples).
    pub reference_dir: PathBuf,

    /// Where the built index is persisted. `None` keeps it in memory only.
    pub index_dir: Option<PathBuf>,

    /// Base URL of the Ollama server.
    pub ollama_base_url: String,

    /// Base URL of the deposition API (the part before `/depositions`).
    pub deposition_base_url: String,

    /// Bearer token for the deposition API.
    #[serde(skip_serializing)]
    pub deposition_token: Option<String>,

    /// Display name used as the deposition creator.
    pub publisher: String,

    /// Deposition title.
    pub title: String,

    /// Deposition description.
    pub description: String,

    /// Where the packaged archive is written.
    pub archive_path: PathBuf,

    /// How strictly generated metadata is checked.
    pub validation: ValidationMode,

    /// Retry policy for the generation call.
    pub generation_retry: RetryPolicy,

    /// Retry policy for each deposition call.
    pub deposition_retry: RetryPolicy,
}

impl Default for CraterConfig {
    fn default() -> Self {
        Self {
            embedding_model: "nomic-embed-text:v1.5".to_string(),
            generation_model: "gemma3:12b".to_string(),
            chunk_size: 500,
            chunk_overlap: 100,
            top_k: 4,
            reference_dir: PathBuf::from("rag_sources"),
            index_dir: None,
            ollama_base_url: "http://localhost:11434".to_string(),
            deposition_base_url: "https://sandbox.zenodo.org/api/deposit".to_string(),
            deposition_token: None,
            publisher: "Doe, John".to_string(),
            title: "Sample RO-Crate".to_string(),
            description: "RO-Crate generated from a notebook directory.".to_string(),
            archive_path: PathBuf::from("ro_crate.zip"),
            validation: ValidationMode::default(),
            generation_retry: RetryPolicy::default(),
            deposition_retry: RetryPolicy::default(),
        }
    }
}

impl CraterConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the embedding model.
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set the generation model.
    pub fn with_generation_model(mut self, model: impl Into<String>) -> Self {
        self.generation_model = model.into();
        self
    }

    /// Set chunk size and overlap.
    pub fn with_chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_overlap = chunk_overlap;
        self
    }

    /// Set the number of retrieved chunks.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the reference document directory.
    pub fn with_reference_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reference_dir = dir.into();
        self
    }

    /// Persist the index under this directory.
    pub fn with_index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.index_dir = Some(dir.into());
        self
    }

    /// Set the Ollama base URL.
    pub fn with_ollama_base_url(mut self, url: impl Into<String>) -> Self {
        self.ollama_base_url = url.into();
        self
    }

    /// Set the deposition API base URL.
    pub fn with_deposition_base_url(mut self, url: impl Into<String>) -> Self {
        self.deposition_base_url = url.into();
        self
    }

    /// Set the deposition bearer token.
    pub fn with_deposition_token(mut self, token: impl Into<String>) -> Self {
        self.deposition_token = Some(token.into());
        self
    }

    /// Set the publisher display name.
    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = publisher.into();
        self
    }

    /// Set the deposition title and description.
    pub fn with_dataset_info(
        mut self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.title = title.into();
        self.description = description.into();
        self
    }

    /// Set the archive output path.
    pub fn with_archive_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.archive_path = path.into();
        self
    }

    /// Set the validation mode.
    pub fn with_validation(mut self, mode: ValidationMode) -> Self {
        self.validation = mode;
        self
    }

    /// Set the generation retry policy.
    pub fn with_generation_retry(mut self, policy: RetryPolicy) -> Self {
        self.generation_retry = policy;
        self
    }

    /// Set the deposition retry policy.
    pub fn with_deposition_retry(mut self, policy: RetryPolicy) -> Self {
        self.deposition_retry = policy;
        self
    }

    /// Reject settings the components cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(CraterError::Config("chunk_size must be positive".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(CraterError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(CraterError::Config("top_k must be positive".into()));
        }
        if self.generation_retry.max_attempts == 0 || self.deposition_retry.max_attempts == 0 {
            return Err(CraterError::Config(
                "retry max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// How much structure the extractor demands from generated metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Only JSON well-formedness is required; structural issues are logged.
    #[default]
    Lenient,

    /// Context, graph, descriptor, root dataset and `@id` references must all
    /// be present and consistent.
    Strict,
}

/// Bounded retry with exponential backoff.
///
/// `max_attempts` counts the first try, so `1` means no retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles after each failure.
    #[serde(with = "millis")]
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    /// A single attempt, no retry.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_millis(500),
        }
    }

    /// Up to `max_attempts` tries, starting at `initial_backoff`.
    pub fn with_backoff(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
        }
    }

    /// Retries allowed after the first attempt.
    pub fn retries(&self) -> usize {
        self.max_attempts.saturating_sub(1) as usize
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_setup() {
        let config = CraterConfig::default();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.archive_path, PathBuf::from("ro_crate.zip"));
        assert_eq!(config.validation, ValidationMode::Lenient);
        assert_eq!(config.generation_retry.max_attempts, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        let config = CraterConfig::new().with_chunking(100, 100);
        assert!(matches!(config.validate(), Err(CraterError::Config(_))));
    }

    #[test]
    fn test_retries_exclude_first_attempt() {
        assert_eq!(RetryPolicy::none().retries(), 0);
        assert_eq!(
            RetryPolicy::with_backoff(4, Duration::from_millis(100)).retries(),
            3
        );
        assert_eq!(RetryPolicy::with_backoff(0, Duration::ZERO).retries(), 0);
    }

    #[test]
    fn test_token_is_not_serialized() {
        let config = CraterConfig::new().with_deposition_token("secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
