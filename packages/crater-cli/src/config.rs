//! Command-line arguments and their mapping onto [`CraterConfig`].
//!
//! Every option can also come from the environment (or a `.env` file).

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crater::{CraterConfig, RetryPolicy, ValidationMode};

#[derive(Parser, Debug)]
#[command(name = "crater")]
#[command(about = "Generate and package RO-Crate metadata for a notebook directory")]
#[command(version)]
pub struct Cli {
    /// Directory holding the notebook and its artifacts
    pub directory: PathBuf,

    /// Upload the archive as a draft deposition
    #[arg(long)]
    pub upload: bool,

    /// Publish the deposition after uploading (requires --upload)
    #[arg(long)]
    pub publish: bool,

    /// Reject structurally incomplete metadata before writing it
    #[arg(long)]
    pub strict: bool,

    /// Embedding model served by Ollama
    #[arg(long, env = "CRATER_EMBEDDING_MODEL", default_value = "nomic-embed-text:v1.5")]
    pub embedding_model: String,

    /// Generation model served by Ollama
    #[arg(long, env = "CRATER_GENERATION_MODEL", default_value = "gemma3:12b")]
    pub generation_model: String,

    /// Ollama server URL
    #[arg(long, env = "OLLAMA_BASE_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Directory of reference documents (.html, .json, .jsonld)
    #[arg(long, env = "CRATER_REFERENCE_DIR", default_value = "rag_sources")]
    pub reference_dir: PathBuf,

    /// Persist the retrieval index here and reuse it across runs
    #[arg(long, env = "CRATER_INDEX_DIR")]
    pub index_dir: Option<PathBuf>,

    /// Maximum characters per reference chunk
    #[arg(long, env = "CRATER_CHUNK_SIZE", default_value_t = 500)]
    pub chunk_size: usize,

    /// Characters shared by adjacent chunks
    #[arg(long, env = "CRATER_CHUNK_OVERLAP", default_value_t = 100)]
    pub chunk_overlap: usize,

    /// Reference chunks placed in the prompt
    #[arg(long, env = "CRATER_TOP_K", default_value_t = 4)]
    pub top_k: usize,

    /// Where to write the archive
    #[arg(long, env = "CRATER_ARCHIVE", default_value = "ro_crate.zip")]
    pub archive: PathBuf,

    /// Deposition API base URL
    #[arg(
        long,
        env = "ZENODO_BASE_URL",
        default_value = "https://sandbox.zenodo.org/api/deposit"
    )]
    pub deposition_url: String,

    /// Deposition API token
    #[arg(long, env = "ZENODO_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Creator name on the deposition, "Family, Given"
    #[arg(long, env = "CRATER_PUBLISHER", default_value = "Doe, John")]
    pub publisher: String,

    /// Deposition title
    #[arg(long, env = "CRATER_TITLE", default_value = "Sample RO-Crate")]
    pub title: String,

    /// Deposition description
    #[arg(
        long,
        env = "CRATER_DESCRIPTION",
        default_value = "RO-Crate generated from a notebook directory."
    )]
    pub description: String,

    /// Attempts per generation or deposition call (1 disables retry)
    #[arg(long, env = "CRATER_MAX_ATTEMPTS", default_value_t = 1)]
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds
    #[arg(long, env = "CRATER_RETRY_BACKOFF_MS", default_value_t = 500)]
    pub retry_backoff_ms: u64,
}

impl Cli {
    /// Build the pipeline configuration from the parsed arguments.
    pub fn to_config(&self) -> CraterConfig {
        let retry = if self.max_attempts <= 1 {
            RetryPolicy::none()
        } else {
            RetryPolicy::with_backoff(
                self.max_attempts,
                Duration::from_millis(self.retry_backoff_ms),
            )
        };
        let validation = if self.strict {
            ValidationMode::Strict
        } else {
            ValidationMode::Lenient
        };

        let mut config = CraterConfig::default()
            .with_embedding_model(&self.embedding_model)
            .with_generation_model(&self.generation_model)
            .with_ollama_base_url(&self.ollama_url)
            .with_reference_dir(&self.reference_dir)
            .with_chunking(self.chunk_size, self.chunk_overlap)
            .with_top_k(self.top_k)
            .with_archive_path(&self.archive)
            .with_deposition_base_url(&self.deposition_url)
            .with_publisher(&self.publisher)
            .with_dataset_info(&self.title, &self.description)
            .with_validation(validation)
            .with_generation_retry(retry)
            .with_deposition_retry(retry);

        if let Some(dir) = &self.index_dir {
            config = config.with_index_dir(dir);
        }
        if let Some(token) = &self.token {
            config = config.with_deposition_token(token);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_map_onto_config() {
        let cli = Cli::try_parse_from([
            "crater",
            "analysis",
            "--strict",
            "--top-k",
            "6",
            "--chunk-size",
            "800",
            "--chunk-overlap",
            "50",
            "--max-attempts",
            "3",
            "--token",
            "secret",
        ])
        .unwrap();
        let config = cli.to_config();

        assert_eq!(cli.directory, PathBuf::from("analysis"));
        assert_eq!(config.validation, ValidationMode::Strict);
        assert_eq!(config.top_k, 6);
        assert_eq!(config.chunk_size, 800);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.generation_retry.max_attempts, 3);
        assert_eq!(config.deposition_retry.max_attempts, 3);
        assert_eq!(config.deposition_token.as_deref(), Some("secret"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_single_attempt_disables_retry() {
        let cli = Cli::try_parse_from(["crater", "analysis", "--max-attempts", "1"]).unwrap();
        assert_eq!(cli.to_config().generation_retry, RetryPolicy::none());
    }

    #[test]
    fn test_directory_is_required() {
        assert!(Cli::try_parse_from(["crater"]).is_err());
    }
}
