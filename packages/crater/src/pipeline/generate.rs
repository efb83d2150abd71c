//! Generation client - one call to the language model per prompt.

use std::time::Instant;

use tracing::{debug, info};

use crate::error::{CraterError, Result};
use crate::pipeline::context::SynthesisPrompt;
use crate::pipeline::retry::with_retry;
use crate::traits::TextGenerator;
use crate::types::RetryPolicy;

/// Verbatim model output. Untrusted until extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGenerationResult(String);

impl RawGenerationResult {
    /// Wrap model text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The raw text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the raw text.
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Sends assembled prompts to a [`TextGenerator`].
pub struct GenerationClient<G: TextGenerator> {
    generator: G,
    retry: RetryPolicy,
}

impl<G: TextGenerator> GenerationClient<G> {
    /// Create a client that calls the generator once per prompt.
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            retry: RetryPolicy::none(),
        }
    }

    /// Retry failed generations under `policy`.
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// The wrapped generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Generate metadata text for `prompt`.
    ///
    /// An empty response is returned as-is; the extractor rejects it.
    pub async fn generate(&self, prompt: &SynthesisPrompt) -> Result<RawGenerationResult> {
        let started = Instant::now();
        let text = with_retry(
            self.retry,
            "generate",
            |e: &CraterError| matches!(e, CraterError::Generation(_)),
            || self.generator.complete(prompt.as_str()),
        )
        .await?;

        debug!(
            model = self.generator.model_id(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Generation finished"
        );
        info!(prompt_len = prompt.len(), response_len = text.len(), "Metadata generated");

        Ok(RawGenerationResult(text))
    }
}
