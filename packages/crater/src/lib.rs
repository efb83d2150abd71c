//! RO-Crate Metadata Synthesis Library
//!
//! Generates an RO-Crate 1.1 metadata document for a directory holding a
//! Jupyter notebook and its artifacts, using retrieval-augmented generation,
//! then validates and packages the result and can deposit it on Zenodo.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crater::{CraterConfig, Pipeline, SynthesisRequest};
//! use crater::ai::{OllamaEmbedder, OllamaGenerator};
//!
//! let config = CraterConfig::default();
//!
//! // Fails before any model call if the directory or notebook is missing
//! let request = SynthesisRequest::from_directory("analysis/")?;
//!
//! let pipeline = Pipeline::build(
//!     config.clone(),
//!     OllamaEmbedder::from_config(&config),
//!     OllamaGenerator::from_config(&config),
//! )
//! .await?;
//!
//! let outcome = pipeline.synthesize(&request).await?;
//! println!("{}", outcome.archive_path.display());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Capability abstractions (Embedder, TextGenerator)
//! - [`types`] - Chunks, notebooks, manifests, metadata graphs, config
//! - [`pipeline`] - Document store, index, assembler, generation, extraction,
//!   packaging, deposition
//! - [`rocrate`] - Reopen a directory as an RO-Crate and resolve its root
//! - [`testing`] - Deterministic mock capabilities

pub mod ai;
pub mod error;
pub mod pipeline;
pub mod rocrate;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{CraterError, Result, ValidationFailure, VerificationFailure};
pub use traits::{Embedder, TextGenerator};
pub use types::{
    Cell, CellType, Chunk, CraterConfig, Entity, FileManifest, MetadataGraph, Notebook,
    NotebookDigest, RetryPolicy, ScoredChunk, ValidationMode, METADATA_FILE_NAME,
    RO_CRATE_CONTEXT,
};

// Re-export pipeline components
pub use pipeline::{
    // Components
    ContextAssembler, DocumentStore, GenerationClient, Packager, RetrievalIndex, TextSplitter,
    // Orchestration
    Pipeline, SynthesisOutcome, SynthesisRequest,
    // Values passed between steps
    RawGenerationResult, SynthesisPrompt,
    // Deposition
    DepositionRecord, Depositor, PublishState,
    // Functions
    extract, find_notebook, strip_wrapping_lines, validate,
};
pub use rocrate::{RoCrate, RootDataset};

// Re-export testing utilities
pub use testing::{MockEmbedder, MockGenerator};
