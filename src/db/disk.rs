//! Persisted on-disk vector index.
//!
//! Layout under the index directory:
//! - `metadata.json` - dimensions, distance metric, segment count
//! - `segment-NNNNN.json` - one file per ingestion batch, appended in order
//!
//! The directory is destroyed and re-initialized wholesale by
//! [`VectorStore::reset`]; the serving path opens it read-only and assumes
//! it does not change for the lifetime of the process.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::db::vectorstore::{rank_documents, VectorStore};
use crate::types::{AppError, Document, Result, SearchResult};

/// Index-level metadata stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexMetadata {
    dimensions: usize,
    metric: String,
    segments: usize,
}

/// In-memory view of the loaded index.
struct DiskIndex {
    dimensions: usize,
    segments: usize,
    documents: Vec<Document>,
}

/// Vector index persisted as a directory of JSON segments.
///
/// Construction does no I/O. The index is loaded lazily on first read, so
/// a server started before any ingestion run reports a retrieval error per
/// query instead of refusing to start.
pub struct DiskVectorStore {
    path: PathBuf,
    loaded: OnceCell<()>,
    inner: RwLock<Option<DiskIndex>>,
}

fn segment_file(n: usize) -> String {
    format!("segment-{:05}.json", n)
}

impl DiskVectorStore {
    /// Create a handle for the index directory at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: OnceCell::new(),
            inner: RwLock::new(None),
        }
    }

    /// The index directory this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load metadata and all segments from disk, once.
    async fn ensure_loaded(&self) -> Result<()> {
        self.loaded
            .get_or_try_init(|| async {
                let metadata = self.read_metadata().await?;

                let mut documents = Vec::new();
                for segment in 0..metadata.segments {
                    let segment_path = self.path.join(segment_file(segment));
                    let raw = tokio::fs::read_to_string(&segment_path).await.map_err(|e| {
                        AppError::Retrieval(format!(
                            "failed to read index segment {}: {}",
                            segment_path.display(),
                            e
                        ))
                    })?;
                    let mut batch: Vec<Document> = serde_json::from_str(&raw).map_err(|e| {
                        AppError::Retrieval(format!(
                            "corrupt index segment {}: {}",
                            segment_path.display(),
                            e
                        ))
                    })?;
                    documents.append(&mut batch);
                }

                debug!(
                    segments = metadata.segments,
                    chunks = documents.len(),
                    "Loaded vector index"
                );

                *self.inner.write() = Some(DiskIndex {
                    dimensions: metadata.dimensions,
                    segments: metadata.segments,
                    documents,
                });
                Ok(())
            })
            .await
            .map(|_| ())
    }

    async fn read_metadata(&self) -> Result<IndexMetadata> {
        let metadata_path = self.path.join("metadata.json");
        let raw = tokio::fs::read_to_string(&metadata_path).await.map_err(|_| {
            AppError::Retrieval(format!(
                "vector index not found at {} (run the ingest command first)",
                self.path.display()
            ))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| AppError::Retrieval(format!("corrupt index metadata: {}", e)))
    }

    async fn write_metadata(&self, metadata: &IndexMetadata) -> Result<()> {
        let json = serde_json::to_string_pretty(metadata)
            .map_err(|e| AppError::Ingestion(format!("failed to serialize index metadata: {}", e)))?;
        tokio::fs::write(self.path.join("metadata.json"), json)
            .await
            .map_err(|e| AppError::Ingestion(format!("failed to write index metadata: {}", e)))
    }
}

#[async_trait]
impl VectorStore for DiskVectorStore {
    fn provider_name(&self) -> &'static str {
        "disk"
    }

    async fn reset(&self, dimensions: usize) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(AppError::Ingestion(format!(
                    "failed to remove old index at {}: {}",
                    self.path.display(),
                    e
                )))
            }
        }
        tokio::fs::create_dir_all(&self.path).await.map_err(|e| {
            AppError::Ingestion(format!(
                "failed to create index directory {}: {}",
                self.path.display(),
                e
            ))
        })?;

        self.write_metadata(&IndexMetadata {
            dimensions,
            metric: "cosine".to_string(),
            segments: 0,
        })
        .await?;

        *self.inner.write() = Some(DiskIndex {
            dimensions,
            segments: 0,
            documents: Vec::new(),
        });
        // A fresh index counts as loaded even if nothing was ever read.
        let _ = self.loaded.set(());

        info!(path = %self.path.display(), dimensions, "Initialized vector index");
        Ok(())
    }

    async fn append(&self, documents: &[Document]) -> Result<usize> {
        self.ensure_loaded().await?;

        let (dimensions, segment) = {
            let guard = self.inner.read();
            let index = guard
                .as_ref()
                .ok_or_else(|| AppError::Retrieval("index not initialized".to_string()))?;
            (index.dimensions, index.segments)
        };

        for doc in documents {
            let embedding = doc.embedding.as_ref().ok_or_else(|| {
                AppError::InvalidInput(format!("Document '{}' is missing embedding", doc.id))
            })?;
            if embedding.len() != dimensions {
                return Err(AppError::InvalidInput(format!(
                    "Document '{}' has {} dimensions, index expects {}",
                    doc.id,
                    embedding.len(),
                    dimensions
                )));
            }
        }

        let segment_path = self.path.join(segment_file(segment));
        let json = serde_json::to_string(documents)
            .map_err(|e| AppError::Ingestion(format!("failed to serialize segment: {}", e)))?;
        tokio::fs::write(&segment_path, json).await.map_err(|e| {
            AppError::Ingestion(format!(
                "failed to write index segment {}: {}",
                segment_path.display(),
                e
            ))
        })?;

        self.write_metadata(&IndexMetadata {
            dimensions,
            metric: "cosine".to_string(),
            segments: segment + 1,
        })
        .await?;

        let mut guard = self.inner.write();
        let index = guard
            .as_mut()
            .ok_or_else(|| AppError::Retrieval("index not initialized".to_string()))?;
        index.documents.extend(documents.iter().cloned());
        index.segments = segment + 1;

        debug!(segment, chunks = documents.len(), "Wrote index segment");
        Ok(documents.len())
    }

    async fn search(
        &self,
        embedding: &[f32],
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<SearchResult>> {
        self.ensure_loaded().await?;
        let guard = self.inner.read();
        let index = guard
            .as_ref()
            .ok_or_else(|| AppError::Retrieval("index not initialized".to_string()))?;
        Ok(rank_documents(&index.documents, embedding, limit, threshold))
    }

    async fn count(&self) -> Result<usize> {
        self.ensure_loaded().await?;
        let guard = self.inner.read();
        let index = guard
            .as_ref()
            .ok_or_else(|| AppError::Retrieval("index not initialized".to_string()))?;
        Ok(index.documents.len())
    }
}
