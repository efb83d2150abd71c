//! Synthesis pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Reference document loading and chunking
//! - Retrieval index build and query
//! - Prompt assembly with grounding context
//! - Generation and structured-output extraction
//! - Packaging (write → verify → pack)
//! - Optional deposition to a publishing service

pub mod context;
pub mod deposit;
pub mod documents;
pub mod extract;
pub mod generate;
pub mod index;
pub mod package;
pub mod prompts;
pub mod retry;
pub mod synthesis;

pub use context::{ContextAssembler, SynthesisPrompt};
pub use deposit::{DepositionRecord, Depositor, PublishState};
pub use documents::{html_to_text, load_document, DocumentStore, TextSplitter};
pub use extract::{extract, strip_wrapping_lines, validate};
pub use generate::{GenerationClient, RawGenerationResult};
pub use index::{cosine_similarity, RetrievalIndex};
pub use package::Packager;
pub use prompts::{template_hash, FILES_SLOT, NOTEBOOK_SLOT, SYNTHESIS_PROMPT};
pub use retry::with_retry;
pub use synthesis::{find_notebook, Pipeline, SynthesisOutcome, SynthesisRequest};
