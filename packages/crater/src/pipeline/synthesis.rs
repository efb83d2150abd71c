//! The synthesis pipeline - from a notebook directory to a packaged RO-Crate.
//!
//! # Flow
//!
//! ```text
//! SynthesisRequest::from_directory   (notebook + manifest, no model calls)
//!         │
//! Pipeline::build                    (reference docs → chunks → index)
//!         │
//! Pipeline::synthesize
//!   assemble → retrieve → generate → extract → write → verify → pack
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{CraterError, Result};
use crate::pipeline::context::ContextAssembler;
use crate::pipeline::documents::DocumentStore;
use crate::pipeline::extract::extract;
use crate::pipeline::generate::GenerationClient;
use crate::pipeline::index::RetrievalIndex;
use crate::pipeline::package::Packager;
use crate::traits::{Embedder, TextGenerator};
use crate::types::{CraterConfig, FileManifest, Notebook, NotebookDigest};

/// Locate the notebook directly inside `directory`.
///
/// With several notebooks the lexicographically first one is used.
pub fn find_notebook(directory: &Path) -> Result<PathBuf> {
    let mut notebooks: Vec<PathBuf> = std::fs::read_dir(directory)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("ipynb")
        })
        .collect();
    notebooks.sort();

    match notebooks.len() {
        0 => Err(CraterError::not_found(
            "notebook (.ipynb)",
            directory.to_path_buf(),
        )),
        1 => Ok(notebooks.remove(0)),
        n => {
            warn!(
                count = n,
                using = %notebooks[0].display(),
                "Several notebooks found; using the first"
            );
            Ok(notebooks.remove(0))
        }
    }
}

/// Everything a synthesis run needs from the target directory.
///
/// Built before any model or network call, so a bad directory fails fast.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    directory: PathBuf,
    notebook_path: PathBuf,
    digest: NotebookDigest,
    manifest: FileManifest,
}

impl SynthesisRequest {
    /// Read the notebook and walk the directory.
    pub fn from_directory(directory: impl AsRef<Path>) -> Result<Self> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(CraterError::not_found("directory", directory));
        }

        let notebook_path = find_notebook(directory)?;
        let digest = Notebook::from_path(&notebook_path)?.digest();
        let manifest = FileManifest::collect(directory)?;

        debug!(
            notebook = %notebook_path.display(),
            digest_len = digest.as_str().len(),
            files = manifest.len(),
            "Synthesis request prepared"
        );

        Ok(Self {
            directory: directory.to_path_buf(),
            notebook_path,
            digest,
            manifest,
        })
    }

    /// The target directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The notebook that was read.
    pub fn notebook_path(&self) -> &Path {
        &self.notebook_path
    }

    /// Markdown digest of the notebook.
    pub fn digest(&self) -> &NotebookDigest {
        &self.digest
    }

    /// Files under the target directory.
    pub fn manifest(&self) -> &FileManifest {
        &self.manifest
    }
}

/// Result of a successful synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisOutcome {
    /// Where the archive was written
    pub archive_path: PathBuf,

    /// `@id` of the verified root dataset
    pub root_id: String,

    /// Number of entries in the metadata graph
    pub entity_count: usize,

    /// SHA-256 of the prompt template the metadata was generated from
    pub template_hash: String,
}

/// Owns the retrieval index and the model capabilities.
///
/// The index is built once in [`Pipeline::build`] and only read afterwards,
/// so `synthesize` takes `&self`.
pub struct Pipeline<E: Embedder, G: TextGenerator> {
    config: CraterConfig,
    embedder: E,
    generation: GenerationClient<G>,
    index: RetrievalIndex,
    assembler: ContextAssembler,
}

impl<E: Embedder, G: TextGenerator> Pipeline<E, G> {
    /// Load and chunk the reference documents, then build or reuse the index.
    pub async fn build(config: CraterConfig, embedder: E, generator: G) -> Result<Self> {
        config.validate()?;

        let store = DocumentStore::from_config(&config)?;
        let chunks = store.load_and_chunk(&config.reference_dir)?;
        let index =
            RetrievalIndex::build_or_load(chunks, &embedder, config.index_dir.as_deref()).await?;

        info!(
            chunks = index.len(),
            embedding_model = embedder.model_id(),
            generation_model = generator.model_id(),
            "Pipeline ready"
        );

        let generation = GenerationClient::new(generator).with_retry(config.generation_retry);
        Ok(Self {
            config,
            embedder,
            generation,
            index,
            assembler: ContextAssembler::new(),
        })
    }

    /// Replace the context assembler (custom template).
    pub fn with_assembler(mut self, assembler: ContextAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &CraterConfig {
        &self.config
    }

    /// The retrieval index.
    pub fn index(&self) -> &RetrievalIndex {
        &self.index
    }

    /// The embedding capability.
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// The generation capability.
    pub fn generator(&self) -> &G {
        self.generation.generator()
    }

    /// Produce, verify, and package metadata for one directory.
    pub async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisOutcome> {
        let query = self
            .assembler
            .retrieval_query(request.digest(), request.manifest());
        let retrieved = self
            .index
            .query(&query, self.config.top_k, &self.embedder)
            .await?;
        debug!(retrieved = retrieved.len(), "Grounding context retrieved");

        let prompt =
            self.assembler
                .assemble_grounded(request.digest(), request.manifest(), &retrieved);
        let raw = self.generation.generate(&prompt).await?;

        let graph = extract(raw.as_str(), self.config.validation)?;

        let packager = Packager::new(request.directory(), &self.config.archive_path);
        packager.write(&graph)?;
        let root = packager.verify()?;

        request.manifest().ensure_present()?;
        let archive_path = packager.pack()?;

        let template_hash = self.assembler.template_hash();
        info!(
            directory = %request.directory().display(),
            archive = %archive_path.display(),
            root = %root.id,
            template = %template_hash,
            "RO-Crate synthesized"
        );

        Ok(SynthesisOutcome {
            archive_path,
            root_id: root.id,
            entity_count: root.entity_count,
            template_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_notebook_picks_first_of_several() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.ipynb"), "{}").unwrap();
        fs::write(dir.path().join("a.ipynb"), "{}").unwrap();
        fs::write(dir.path().join("c.txt"), "").unwrap();

        let found = find_notebook(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("a.ipynb"));
    }

    #[test]
    fn test_find_notebook_ignores_nested_notebooks() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("x.ipynb"), "{}").unwrap();

        assert!(matches!(
            find_notebook(dir.path()),
            Err(CraterError::NotFound { .. })
        ));
    }

    #[test]
    fn test_request_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = SynthesisRequest::from_directory(dir.path().join("absent"));
        assert!(matches!(
            result,
            Err(CraterError::NotFound { what: "directory", .. })
        ));
    }

    #[test]
    fn test_request_collects_digest_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("nb.ipynb"),
            r##"{"cells": [{"cell_type": "markdown", "source": ["# Study"]}]}"##,
        )
        .unwrap();
        fs::write(dir.path().join("data.csv"), "a\n").unwrap();

        let request = SynthesisRequest::from_directory(dir.path()).unwrap();
        assert_eq!(request.digest().as_str(), "# Study");
        assert_eq!(request.manifest().len(), 2);
        assert_eq!(request.notebook_path(), dir.path().join("nb.ipynb"));
    }
}
