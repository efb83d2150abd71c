//! Capability implementations backed by real model servers.
//!
//! Users can use these directly or implement [`crate::Embedder`] and
//! [`crate::TextGenerator`] themselves.

#[cfg(feature = "ollama")]
mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaEmbedder, OllamaGenerator};
