//! Data types shared across the pipeline.

pub mod chunk;
pub mod config;
pub mod manifest;
pub mod metadata;
pub mod notebook;

pub use chunk::{Chunk, ScoredChunk};
pub use config::{CraterConfig, RetryPolicy, ValidationMode};
pub use manifest::FileManifest;
pub use metadata::{Entity, MetadataGraph, METADATA_FILE_NAME, RO_CRATE_CONTEXT, ROOT_ID};
pub use notebook::{Cell, CellType, Notebook, NotebookDigest};
