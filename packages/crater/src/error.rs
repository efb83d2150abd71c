//! Typed errors for the crater library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match on
//! the failure class and decide whether to abort.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur anywhere in the synthesis pipeline.
#[derive(Debug, Error)]
pub enum CraterError {
    /// Target directory, notebook, or reference directory is missing
    #[error("not found: {what} ({path})")]
    NotFound { what: &'static str, path: PathBuf },

    /// Reference document with an extension the document store cannot load
    #[error("unsupported reference format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// Embedding failed while building the retrieval index
    #[error("index build failed: {reason}")]
    IndexBuild { reason: String },

    /// Embedding capability failed outside of index construction
    #[error("embedding error: {0}")]
    Embedding(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Generation capability failed
    #[error("generation error: {0}")]
    Generation(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Model output could not be turned into acceptable metadata
    #[error("metadata validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    /// Written metadata could not be reopened as a research-object container
    #[error("RO-Crate verification failed: {0}")]
    Verification(#[from] VerificationFailure),

    /// A manifest entry disappeared between collection and packaging
    #[error("manifest entry no longer exists: {path}")]
    StaleManifest { path: PathBuf },

    /// Archive creation failed
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// A deposition step failed; remaining steps were not attempted
    #[error("deposition failed during {step}: {source}")]
    Deposition {
        step: &'static str,
        #[source]
        source: zenodo_client::ZenodoError,
    },

    /// Invalid configuration
    #[error("config error: {0}")]
    Config(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CraterError {
    pub(crate) fn not_found(what: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::NotFound {
            what,
            path: path.into(),
        }
    }
}

/// Reasons a raw model response was rejected by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// The trimmed text is not parseable JSON
    #[error("output is not structured JSON: {0}")]
    NotStructured(String),

    /// Top-level value is not a JSON object
    #[error("top-level value is not an object")]
    NotAnObject,

    /// `@context` is absent
    #[error("missing @context")]
    MissingContext,

    /// `@graph` is absent or not an array
    #[error("missing or malformed @graph")]
    MissingGraph,

    /// A required entity is absent from the graph
    #[error("graph has no {0} entity")]
    MissingEntity(&'static str),

    /// `hasPart` / `mainEntity` points at an `@id` not present in the graph
    #[error("{property} of {from} references unknown @id {target}")]
    DanglingReference {
        from: String,
        property: &'static str,
        target: String,
    },
}

/// Reasons a written metadata file failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationFailure {
    /// No metadata file in the directory
    #[error("metadata file missing: {0}")]
    MissingMetadata(PathBuf),

    /// Metadata file could not be read or parsed
    #[error("metadata file unreadable: {0}")]
    Unreadable(String),

    /// Metadata has no `@graph` array
    #[error("metadata has no @graph")]
    NoGraph,

    /// The root entity could not be resolved
    #[error("root dataset {0} not found")]
    RootNotFound(String),

    /// The root entity exists but is not a Dataset
    #[error("root entity {0} is not a Dataset")]
    RootNotDataset(String),
}

/// Result type alias for crater operations.
pub type Result<T> = std::result::Result<T, CraterError>;
