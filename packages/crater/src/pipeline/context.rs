//! Context assembler - composes the generation prompt.

use std::fmt;

use crate::error::{CraterError, Result};
use crate::pipeline::prompts::{
    fill_template, template_hash, FILES_SLOT, GROUNDING_HEADER, GROUNDING_SEPARATOR,
    NOTEBOOK_SLOT, SYNTHESIS_PROMPT,
};
use crate::types::{FileManifest, NotebookDigest, ScoredChunk};

/// A fully assembled generation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisPrompt(String);

impl SynthesisPrompt {
    /// The prompt text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the prompt is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the prompt text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SynthesisPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fills the synthesis template and optionally prepends grounding context.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    template: String,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self {
            template: SYNTHESIS_PROMPT.to_string(),
        }
    }
}

impl ContextAssembler {
    /// Assembler over the built-in RO-Crate 1.1 template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom template. Each slot must occur exactly once.
    pub fn with_template(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for slot in [NOTEBOOK_SLOT, FILES_SLOT] {
            let count = template.matches(slot).count();
            if count != 1 {
                return Err(CraterError::Config(format!(
                    "template must contain {slot} exactly once (found {count})"
                )));
            }
        }
        Ok(Self { template })
    }

    /// The template in use.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// SHA-256 of the template in use.
    pub fn template_hash(&self) -> String {
        template_hash(&self.template)
    }

    /// Substitute the digest and the stringified manifest into the template.
    pub fn assemble(&self, digest: &NotebookDigest, manifest: &FileManifest) -> SynthesisPrompt {
        let files = manifest.render();
        SynthesisPrompt(fill_template(
            &self.template,
            &[(NOTEBOOK_SLOT, digest.as_str()), (FILES_SLOT, &files)],
        ))
    }

    /// Text used to query the retrieval index: the plain assembled prompt.
    pub fn retrieval_query(&self, digest: &NotebookDigest, manifest: &FileManifest) -> String {
        self.assemble(digest, manifest).into_string()
    }

    /// Prompt with retrieved excerpts placed ahead of the instructions.
    ///
    /// The instruction block is identical to [`Self::assemble`]; with no
    /// excerpts the result equals the plain prompt.
    pub fn assemble_grounded(
        &self,
        digest: &NotebookDigest,
        manifest: &FileManifest,
        retrieved: &[ScoredChunk],
    ) -> SynthesisPrompt {
        let instructions = self.assemble(digest, manifest);
        if retrieved.is_empty() {
            return instructions;
        }

        let excerpts: Vec<String> = retrieved
            .iter()
            .map(|scored| format!("[{}]\n{}", scored.chunk.source_id, scored.chunk.text))
            .collect();

        SynthesisPrompt(format!(
            "{GROUNDING_HEADER}\n\n{}{GROUNDING_SEPARATOR}{}",
            excerpts.join("\n\n"),
            instructions.as_str()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chunk;
    use proptest::prelude::*;

    fn manifest() -> FileManifest {
        FileManifest::new(["dir/nb.ipynb", "dir/data.csv"])
    }

    #[test]
    fn test_assemble_fills_both_slots() {
        let prompt = ContextAssembler::new().assemble(&NotebookDigest::new("# Title"), &manifest());
        assert!(prompt.as_str().contains("# Title"));
        assert!(prompt.as_str().contains(r#"["dir/nb.ipynb","dir/data.csv"]"#));
        assert!(!prompt.as_str().contains(NOTEBOOK_SLOT));
        assert!(!prompt.as_str().contains(FILES_SLOT));
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let assembler = ContextAssembler::new();
        let digest = NotebookDigest::new("notes");
        assert_eq!(
            assembler.assemble(&digest, &manifest()),
            assembler.assemble(&digest, &manifest())
        );
    }

    #[test]
    fn test_digest_containing_slot_text_is_not_expanded() {
        let assembler = ContextAssembler::with_template("N={notebook_content} F={files}").unwrap();
        let prompt = assembler.assemble(&NotebookDigest::new("{files}"), &FileManifest::default());
        assert_eq!(prompt.as_str(), "N={files} F=[]");
    }

    #[test]
    fn test_template_hash_tracks_template() {
        assert_eq!(
            ContextAssembler::new().template_hash(),
            template_hash(SYNTHESIS_PROMPT)
        );
        let custom = ContextAssembler::with_template("{notebook_content}{files}").unwrap();
        assert_ne!(custom.template_hash(), ContextAssembler::new().template_hash());
    }

    #[test]
    fn test_custom_template_needs_each_slot_once() {
        assert!(ContextAssembler::with_template("{files}").is_err());
        assert!(ContextAssembler::with_template("{notebook_content}{files}{files}").is_err());
    }

    #[test]
    fn test_retrieval_query_is_plain_prompt() {
        let assembler = ContextAssembler::new();
        let digest = NotebookDigest::new("notes");
        assert_eq!(
            assembler.retrieval_query(&digest, &manifest()),
            assembler.assemble(&digest, &manifest()).into_string()
        );
    }

    #[test]
    fn test_grounded_prompt_keeps_instructions_intact() {
        let assembler = ContextAssembler::new();
        let digest = NotebookDigest::new("notes");
        let plain = assembler.assemble(&digest, &manifest());

        assert_eq!(assembler.assemble_grounded(&digest, &manifest(), &[]), plain);

        let retrieved = vec![ScoredChunk {
            chunk: Chunk::new("The root data entity is a Dataset.", "spec.html", 0),
            score: 0.9,
        }];
        let grounded = assembler.assemble_grounded(&digest, &manifest(), &retrieved);
        assert!(grounded.as_str().starts_with(GROUNDING_HEADER));
        assert!(grounded.as_str().contains("[spec.html]\nThe root data entity is a Dataset."));
        assert!(grounded.as_str().ends_with(plain.as_str()));
    }

    proptest! {
        #[test]
        fn prop_prompt_length_identity(
            digest in ".*",
            paths in proptest::collection::vec("[a-z{}/._]{1,12}", 0..6),
        ) {
            let manifest = FileManifest::new(paths);
            let digest = NotebookDigest::new(digest);
            let prompt = ContextAssembler::new().assemble(&digest, &manifest);

            let expected = SYNTHESIS_PROMPT.len() - NOTEBOOK_SLOT.len() - FILES_SLOT.len()
                + digest.as_str().len()
                + manifest.render().len();
            prop_assert_eq!(prompt.len(), expected);
        }
    }
}
