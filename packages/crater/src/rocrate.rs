//! RO-Crate reader - reopens a directory as a research-object container.

use std::path::{Path, PathBuf};

use crate::error::VerificationFailure;
use crate::types::metadata::{LEGACY_METADATA_FILE_NAME, METADATA_FILE_NAME};
use crate::types::MetadataGraph;

/// The resolved root dataset of a crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDataset {
    /// `@id` of the root entity
    pub id: String,

    /// `name` property, when present as a string
    pub name: Option<String>,

    /// `@id`s listed in the root's `hasPart`
    pub has_part: Vec<String>,

    /// Number of entries in the crate's graph
    pub entity_count: usize,
}

/// A crate directory with its parsed metadata.
#[derive(Debug, Clone)]
pub struct RoCrate {
    directory: PathBuf,
    metadata_path: PathBuf,
    graph: MetadataGraph,
}

impl RoCrate {
    /// Open `directory`, reading its metadata descriptor file.
    pub fn open(directory: &Path) -> Result<Self, VerificationFailure> {
        let metadata_path = [METADATA_FILE_NAME, LEGACY_METADATA_FILE_NAME]
            .iter()
            .map(|name| directory.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| VerificationFailure::MissingMetadata(directory.join(METADATA_FILE_NAME)))?;

        let text = std::fs::read_to_string(&metadata_path)
            .map_err(|e| VerificationFailure::Unreadable(e.to_string()))?;
        let document = serde_json::from_str(&text)
            .map_err(|e| VerificationFailure::Unreadable(e.to_string()))?;

        Ok(Self {
            directory: directory.to_path_buf(),
            metadata_path,
            graph: MetadataGraph::from_value(document),
        })
    }

    /// Directory the crate was opened from.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the metadata file that was read.
    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// The parsed metadata.
    pub fn graph(&self) -> &MetadataGraph {
        &self.graph
    }

    /// Resolve the root dataset.
    ///
    /// The descriptor's `about` names the root; without a descriptor the root
    /// is `./`. The root must exist and be typed `Dataset`.
    pub fn root_dataset(&self) -> Result<RootDataset, VerificationFailure> {
        if !self.graph.has_graph() {
            return Err(VerificationFailure::NoGraph);
        }

        let root_id = self.graph.root_id();
        let root = self
            .graph
            .entity(&root_id)
            .ok_or_else(|| VerificationFailure::RootNotFound(root_id.clone()))?;
        if !root.has_type("Dataset") {
            return Err(VerificationFailure::RootNotDataset(root_id));
        }

        Ok(RootDataset {
            name: root
                .property("name")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            has_part: root
                .references("hasPart")
                .into_iter()
                .map(str::to_string)
                .collect(),
            entity_count: self.graph.entities().len(),
            id: root_id,
        })
    }
}
