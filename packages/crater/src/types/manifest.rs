//! File manifest - every file under the target directory.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use crate::error::{CraterError, Result};
use crate::types::metadata::METADATA_FILE_NAME;

/// True for regular files and for symlinks that resolve to a file.
///
/// Other symlinks (to directories, or dangling) are logged and skipped.
pub(crate) fn is_file_entry(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    if !file_type.is_symlink() {
        return false;
    }
    if entry.path().is_file() {
        return true;
    }
    warn!(path = %entry.path().display(), "Skipping symlink that does not resolve to a file");
    false
}

/// Ordered list of the files under a target directory.
///
/// Each entry is the directory path joined with the file's relative path.
/// Entries are sorted by relative path so the manifest, and every prompt built
/// from it, is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileManifest {
    paths: Vec<PathBuf>,
}

impl FileManifest {
    /// Create a manifest from explicit paths.
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Walk `directory` recursively and collect every file.
    ///
    /// Symlinks to files are listed under their own name; directory symlinks
    /// are not descended into. The RO-Crate metadata file at the directory
    /// root is skipped; it is an output of the pipeline, not an input.
    pub fn collect(directory: &Path) -> Result<Self> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(directory).sort_by_file_name() {
            let entry = entry.map_err(|e| CraterError::Io(e.into()))?;
            if !is_file_entry(&entry) {
                continue;
            }
            if entry.depth() == 1 && entry.file_name() == METADATA_FILE_NAME {
                continue;
            }
            paths.push(entry.into_path());
        }
        Ok(Self { paths })
    }

    /// The collected paths.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// True when no files were found.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// JSON array of the paths, as substituted into the prompt.
    pub fn render(&self) -> String {
        let entries: Vec<String> = self
            .paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
    }

    /// Fail with the first entry that no longer exists on disk.
    pub fn ensure_present(&self) -> Result<()> {
        match self.paths.iter().find(|p| !p.exists()) {
            Some(missing) => Err(CraterError::StaleManifest {
                path: missing.clone(),
            }),
            None => Ok(()),
        }
    }
}
