//! Text generation capability.

use async_trait::async_trait;

use crate::error::Result;

/// Completes a prompt with a language model.
///
/// Implementations should pin sampling to be as deterministic as the backend
/// allows; the output is expected to parse as JSON.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Identifier of the generation model.
    fn model_id(&self) -> &str;

    /// Run one completion and return the verbatim text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
