//! Capability traits for the external model services.
//!
//! - [`Embedder`] - text to vector
//! - [`TextGenerator`] - prompt to completion text

pub mod embedder;
pub mod generator;

pub use embedder::Embedder;
pub use generator::TextGenerator;
