//! Packager - writes, verifies, and archives the metadata.
//!
//! Order is fixed: `write` → `verify` → `pack`. `pack` removes the metadata
//! file from the source directory only after the archive is complete.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{CraterError, Result, VerificationFailure};
use crate::rocrate::{RoCrate, RootDataset};
use crate::types::manifest::is_file_entry;
use crate::types::{MetadataGraph, METADATA_FILE_NAME};

/// Packages one target directory.
#[derive(Debug, Clone)]
pub struct Packager {
    directory: PathBuf,
    archive_path: PathBuf,
}

impl Packager {
    /// Create a packager for `directory`, archiving to `archive_path`.
    pub fn new(directory: impl Into<PathBuf>, archive_path: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            archive_path: archive_path.into(),
        }
    }

    /// The target directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Where the archive is written.
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// `<directory>/ro-crate-metadata.json`.
    pub fn metadata_path(&self) -> PathBuf {
        self.directory.join(METADATA_FILE_NAME)
    }

    /// Write `graph` as pretty-printed JSON, replacing any existing file.
    pub fn write(&self, graph: &MetadataGraph) -> Result<PathBuf> {
        let path = self.metadata_path();
        std::fs::write(&path, graph.to_pretty_json()?)?;
        debug!(path = %path.display(), "Metadata written");
        Ok(path)
    }

    /// Reopen the directory as an RO-Crate and resolve its root dataset.
    pub fn verify(&self) -> std::result::Result<RootDataset, VerificationFailure> {
        let root = RoCrate::open(&self.directory)?.root_dataset()?;
        info!(root = %root.id, entities = root.entity_count, "RO-Crate verified");
        Ok(root)
    }

    /// Zip the whole directory tree, then remove the metadata file.
    ///
    /// On failure the partial archive is removed and the metadata file is
    /// left in place.
    pub fn pack(&self) -> Result<PathBuf> {
        let metadata_path = self.metadata_path();
        if !metadata_path.is_file() {
            return Err(VerificationFailure::MissingMetadata(metadata_path).into());
        }

        if let Err(e) = self.write_archive() {
            if let Err(cleanup) = std::fs::remove_file(&self.archive_path) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(path = %self.archive_path.display(), error = %cleanup, "Could not remove partial archive");
                }
            }
            return Err(e);
        }

        std::fs::remove_file(&metadata_path)?;
        info!(archive = %self.archive_path.display(), "RO-Crate packed");
        Ok(self.archive_path.clone())
    }

    fn write_archive(&self) -> Result<()> {
        let file = File::create(&self.archive_path)?;
        let skip = self.archive_path.canonicalize().ok();

        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut entries = 0usize;
        for entry in WalkDir::new(&self.directory).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| CraterError::Io(e.into()))?;
            let path = entry.path();

            let is_file = is_file_entry(&entry);
            if is_file
                && skip.is_some()
                && path.canonicalize().ok() == skip
            {
                continue;
            }

            let Some(name) = archive_name(&self.directory, path) else {
                continue;
            };

            if entry.file_type().is_dir() {
                zip.add_directory(format!("{name}/"), options)?;
            } else if is_file {
                zip.start_file(name, options)?;
                let mut source = File::open(path)?;
                io::copy(&mut source, &mut zip)?;
            } else {
                continue;
            }
            entries += 1;
        }

        let mut writer = zip.finish()?;
        io::Write::flush(&mut writer)?;
        debug!(entries, "Archive written");
        Ok(())
    }
}

/// Relative path of `path` under `root`, joined with `/`.
fn archive_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}
