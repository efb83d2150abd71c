//! Retrieval index - embedded chunks with a linear cosine-similarity scan.
//!
//! The index is built once per pipeline and is read-only afterwards. When a
//! location is configured the embedded chunks are persisted and reused by the
//! next build with the same embedding model and chunk set.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::{CraterError, Result};
use crate::traits::Embedder;
use crate::types::{Chunk, ScoredChunk};

/// File name of the persisted index inside the index directory.
pub const INDEX_FILE_NAME: &str = "index.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct PersistedIndex {
    model_id: String,
    fingerprint: String,
    entries: Vec<IndexEntry>,
}

/// Nearest-neighbor index over reference chunks.
#[derive(Debug, Clone)]
pub struct RetrievalIndex {
    model_id: String,
    entries: Vec<IndexEntry>,
}

impl RetrievalIndex {
    /// Embed every chunk exactly once and build the index.
    ///
    /// Any embedding failure, or a vector whose dimension differs from the
    /// first one, aborts the build.
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn Embedder) -> Result<Self> {
        let mut entries = Vec::with_capacity(chunks.len());
        let mut dimension = None;

        for chunk in chunks {
            let vector = embedder
                .embed(&chunk.text)
                .await
                .map_err(|e| CraterError::IndexBuild {
                    reason: format!("embedding {} @{}: {e}", chunk.source_id, chunk.start_offset),
                })?;

            match dimension {
                None => dimension = Some(vector.len()),
                Some(expected) if expected != vector.len() => {
                    return Err(CraterError::IndexBuild {
                        reason: format!(
                            "inconsistent embedding dimension: expected {expected}, got {} for {}",
                            vector.len(),
                            chunk.source_id
                        ),
                    });
                }
                Some(_) => {}
            }

            entries.push(IndexEntry { chunk, vector });
        }

        info!(
            chunks = entries.len(),
            dimension = dimension.unwrap_or(0),
            model = embedder.model_id(),
            "Retrieval index built"
        );

        Ok(Self {
            model_id: embedder.model_id().to_string(),
            entries,
        })
    }

    /// Build the index, reusing a persisted copy under `index_dir` when it
    /// matches the embedding model and chunk set.
    pub async fn build_or_load(
        chunks: Vec<Chunk>,
        embedder: &dyn Embedder,
        index_dir: Option<&Path>,
    ) -> Result<Self> {
        let Some(dir) = index_dir else {
            return Self::build(chunks, embedder).await;
        };

        let fingerprint = fingerprint(&chunks);
        if let Some(index) = Self::load(dir, embedder.model_id(), &fingerprint) {
            info!(chunks = index.len(), path = %dir.display(), "Reusing persisted retrieval index");
            return Ok(index);
        }

        let index = Self::build(chunks, embedder).await?;
        index.save(dir, &fingerprint)?;
        Ok(index)
    }

    /// Persist the index as JSON under `dir`.
    pub fn save(&self, dir: &Path, fingerprint: &str) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let persisted = PersistedIndex {
            model_id: self.model_id.clone(),
            fingerprint: fingerprint.to_string(),
            entries: self.entries.clone(),
        };
        let path = dir.join(INDEX_FILE_NAME);
        std::fs::write(&path, serde_json::to_vec(&persisted)?)?;
        debug!(path = %path.display(), "Retrieval index persisted");
        Ok(())
    }

    fn load(dir: &Path, model_id: &str, fingerprint: &str) -> Option<Self> {
        let path = dir.join(INDEX_FILE_NAME);
        let bytes = std::fs::read(&path).ok()?;

        let persisted: PersistedIndex = match serde_json::from_slice(&bytes) {
            Ok(p) => p,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring corrupt persisted index");
                return None;
            }
        };

        if persisted.model_id != model_id || persisted.fingerprint != fingerprint {
            warn!(
                path = %path.display(),
                persisted_model = %persisted.model_id,
                "Persisted index does not match current chunks or model; rebuilding"
            );
            return None;
        }

        Some(Self {
            model_id: persisted.model_id,
            entries: persisted.entries,
        })
    }

    /// Return up to `k` chunks most similar to `text`, best first.
    ///
    /// Equal scores keep insertion order.
    pub async fn query(
        &self,
        text: &str,
        k: usize,
        embedder: &dyn Embedder,
    ) -> Result<Vec<ScoredChunk>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query = embedder.embed(text).await?;
        let expected = self.entries[0].vector.len();
        if query.len() != expected {
            return Err(CraterError::Embedding(
                format!(
                    "query embedding has dimension {}, index has {expected}",
                    query.len()
                )
                .into(),
            ));
        }

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&query, &entry.vector),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);

        debug!(k, returned = scored.len(), "Retrieval query answered");
        Ok(scored)
    }

    /// Embedding model the vectors were produced with.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no chunks are indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// SHA-256 over the chunk set, used to detect a stale persisted index.
pub fn fingerprint(chunks: &[Chunk]) -> String {
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update(chunk.source_id.as_bytes());
        hasher.update([0]);
        hasher.update(chunk.start_offset.to_le_bytes());
        hasher.update(chunk.text.as_bytes());
        hasher.update([0]);
    }
    format!("{:x}", hasher.finalize())
}

/// Cosine similarity between two vectors; 0 for mismatched, zero, or
/// non-finite input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a * norm_b);
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockEmbedder;

    fn chunks() -> Vec<Chunk> {
        vec![
            Chunk::new("root data entity", "spec.html", 0),
            Chunk::new("file data entity", "spec.html", 400),
            Chunk::new("contextual entity", "context.jsonld", 0),
        ]
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &[1.0, 0.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 0.001);
        assert!((cosine_similarity(&a, &[-1.0, 0.0, 0.0]) + 1.0).abs() < 0.001);
        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&a, &[f32::NAN, 0.0, 0.0]), 0.0);
        assert_eq!(
            cosine_similarity(&[f32::MAX, 0.0], &[f32::MAX, f32::MAX]),
            0.0
        );
    }

    #[tokio::test]
    async fn test_build_embeds_each_chunk_once() {
        let embedder = MockEmbedder::new();
        let index = RetrievalIndex::build(chunks(), &embedder).await.unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(embedder.call_count(), 3);
    }

    #[tokio::test]
    async fn test_query_returns_exact_match_first() {
        let embedder = MockEmbedder::new();
        let index = RetrievalIndex::build(chunks(), &embedder).await.unwrap();

        let results = index.query("file data entity", 2, &embedder).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "file data entity");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let embedder = MockEmbedder::new()
            .with_embedding("a", vec![1.0, 0.0])
            .with_embedding("b", vec![1.0, 0.0])
            .with_embedding("q", vec![1.0, 0.0]);
        let index = RetrievalIndex::build(
            vec![Chunk::new("a", "x", 0), Chunk::new("b", "x", 1)],
            &embedder,
        )
        .await
        .unwrap();

        let results = index.query("q", 2, &embedder).await.unwrap();
        assert_eq!(results[0].chunk.text, "a");
        assert_eq!(results[1].chunk.text, "b");
    }

    #[tokio::test]
    async fn test_non_finite_vectors_rank_last() {
        let embedder = MockEmbedder::new()
            .with_embedding("broken", vec![f32::NAN, 1.0])
            .with_embedding("huge", vec![f32::MAX, f32::MAX])
            .with_embedding("near", vec![1.0, 0.1])
            .with_embedding("q", vec![1.0, 0.0]);
        let index = RetrievalIndex::build(
            vec![
                Chunk::new("broken", "x", 0),
                Chunk::new("huge", "x", 1),
                Chunk::new("near", "x", 2),
            ],
            &embedder,
        )
        .await
        .unwrap();

        let results = index.query("q", 3, &embedder).await.unwrap();
        assert_eq!(results[0].chunk.text, "near");
        assert!(results.iter().all(|r| r.score.is_finite()));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_index_build_error() {
        let embedder = MockEmbedder::new().failing_on("contextual entity");
        let result = RetrievalIndex::build(chunks(), &embedder).await;
        assert!(matches!(result, Err(CraterError::IndexBuild { .. })));
    }

    #[tokio::test]
    async fn test_inconsistent_dimension_is_index_build_error() {
        let embedder = MockEmbedder::new().with_embedding("file data entity", vec![1.0, 2.0]);
        let result = RetrievalIndex::build(chunks(), &embedder).await;
        assert!(matches!(result, Err(CraterError::IndexBuild { .. })));
    }

    #[tokio::test]
    async fn test_persisted_index_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = MockEmbedder::new();

        RetrievalIndex::build_or_load(chunks(), &embedder, Some(dir.path()))
            .await
            .unwrap();
        assert_eq!(embedder.call_count(), 3);
        assert!(dir.path().join(INDEX_FILE_NAME).exists());

        let reused = RetrievalIndex::build_or_load(chunks(), &embedder, Some(dir.path()))
            .await
            .unwrap();
        assert_eq!(reused.len(), 3);
        assert_eq!(embedder.call_count(), 3);
    }

    #[tokio::test]
    async fn test_changed_chunks_or_corrupt_file_trigger_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let embedder = MockEmbedder::new();

        RetrievalIndex::build_or_load(chunks(), &embedder, Some(dir.path()))
            .await
            .unwrap();

        let mut changed = chunks();
        changed.pop();
        RetrievalIndex::build_or_load(changed, &embedder, Some(dir.path()))
            .await
            .unwrap();
        assert_eq!(embedder.call_count(), 5);

        std::fs::write(dir.path().join(INDEX_FILE_NAME), "not json").unwrap();
        RetrievalIndex::build_or_load(chunks(), &embedder, Some(dir.path()))
            .await
            .unwrap();
        assert_eq!(embedder.call_count(), 8);
    }

    #[test]
    fn test_fingerprint_depends_on_content() {
        let mut other = chunks();
        other[0].text.push('!');
        assert_ne!(fingerprint(&chunks()), fingerprint(&other));
        assert_eq!(fingerprint(&chunks()), fingerprint(&chunks()));
    }
}
