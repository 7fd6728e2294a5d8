//! Vector Store Abstraction Layer
//!
//! A unified interface over vector index backends. The application holds a
//! single index (no named collections): ingestion rebuilds it wholesale,
//! the query path only searches it.
//!
//! ```rust,ignore
//! use docbot::db::{DiskVectorStore, VectorStore};
//!
//! let store = DiskVectorStore::new("data/index");
//!
//! // Ingestion: destructive rebuild, then batched appends
//! store.reset(768).await?;
//! store.append(&first_batch).await?;
//! store.append(&second_batch).await?;
//!
//! // Query path
//! let results = store.search(&query_embedding, 3, 0.5).await?;
//! ```

use crate::types::{AppError, Document, Result, SearchResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Abstract trait for vector index operations.
///
/// # Implementors
///
/// - [`super::DiskVectorStore`] - persisted directory (default)
/// - [`InMemoryVectorStore`] - testing only
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Get the name of this vector store backend.
    fn provider_name(&self) -> &'static str;

    /// Destroy any existing index and initialize an empty one.
    ///
    /// Ingestion is replace-not-append: callers must understand that the
    /// previous index is gone after this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the old index cannot be removed or the new one
    /// cannot be initialized.
    async fn reset(&self, dimensions: usize) -> Result<()>;

    /// Append a batch of embedded documents to the index.
    ///
    /// # Errors
    ///
    /// Returns an error if any document lacks an embedding, if the index
    /// was never initialized, or if the write fails. A failed append is
    /// fatal to the ingestion run; no cleanup is attempted.
    async fn append(&self, documents: &[Document]) -> Result<usize>;

    /// Search for the chunks most similar to `embedding`.
    ///
    /// # Returns
    ///
    /// Up to `limit` results with `score >= threshold`, sorted by score
    /// descending. An empty result set is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Retrieval`] when the index is missing or
    /// corrupt.
    async fn search(
        &self,
        embedding: &[f32],
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Number of chunks in the index.
    async fn count(&self) -> Result<usize>;
}

/// Cosine similarity between two vectors, 0.0 when either is degenerate.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Rank stored documents against a query embedding.
///
/// Shared by the in-memory and on-disk backends.
pub(crate) fn rank_documents(
    documents: &[Document],
    embedding: &[f32],
    limit: usize,
    threshold: f32,
) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = documents
        .iter()
        .filter_map(|doc| {
            let doc_embedding = doc.embedding.as_ref()?;
            let score = cosine_similarity(embedding, doc_embedding);
            if score >= threshold {
                Some(SearchResult {
                    document: Document {
                        id: doc.id.clone(),
                        content: doc.content.clone(),
                        metadata: doc.metadata.clone(),
                        embedding: None, // Don't return embeddings in results
                    },
                    score,
                })
            } else {
                None
            }
        })
        .collect();

    // Sort by score descending
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit);
    results
}

// ============================================================================
// In-Memory Vector Store (for testing)
// ============================================================================

/// In-memory vector store for testing purposes.
///
/// Data is not persisted and will be lost when the process exits.
/// Uses cosine similarity for vector comparisons.
#[derive(Default)]
pub struct InMemoryVectorStore {
    inner: RwLock<Option<InMemoryIndex>>,
}

#[derive(Default)]
struct InMemoryIndex {
    dimensions: usize,
    documents: Vec<Document>,
    ids: HashMap<String, usize>,
}

impl InMemoryVectorStore {
    /// Create a new, uninitialized in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn provider_name(&self) -> &'static str {
        "in-memory"
    }

    async fn reset(&self, dimensions: usize) -> Result<()> {
        *self.inner.write() = Some(InMemoryIndex {
            dimensions,
            documents: Vec::new(),
            ids: HashMap::new(),
        });
        Ok(())
    }

    async fn append(&self, documents: &[Document]) -> Result<usize> {
        let mut guard = self.inner.write();
        let index = guard
            .as_mut()
            .ok_or_else(|| AppError::Retrieval("index not initialized".to_string()))?;

        let mut count = 0;
        for doc in documents {
            let embedding = doc
                .embedding
                .as_ref()
                .ok_or_else(|| {
                    AppError::InvalidInput(format!("Document '{}' is missing embedding", doc.id))
                })?;
            if embedding.len() != index.dimensions {
                return Err(AppError::InvalidInput(format!(
                    "Document '{}' has {} dimensions, index expects {}",
                    doc.id,
                    embedding.len(),
                    index.dimensions
                )));
            }
            // Same id overwrites the previous entry, so re-runs stay idempotent.
            if let Some(&pos) = index.ids.get(&doc.id) {
                index.documents[pos] = doc.clone();
            } else {
                index.ids.insert(doc.id.clone(), index.documents.len());
                index.documents.push(doc.clone());
            }
            count += 1;
        }

        Ok(count)
    }

    async fn search(
        &self,
        embedding: &[f32],
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<SearchResult>> {
        let guard = self.inner.read();
        let index = guard
            .as_ref()
            .ok_or_else(|| AppError::Retrieval("index not initialized".to_string()))?;
        Ok(rank_documents(&index.documents, embedding, limit, threshold))
    }

    async fn count(&self) -> Result<usize> {
        let guard = self.inner.read();
        let index = guard
            .as_ref()
            .ok_or_else(|| AppError::Retrieval("index not initialized".to_string()))?;
        Ok(index.documents.len())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentMetadata;

    fn create_test_document(id: &str, content: &str, embedding: Vec<f32>) -> Document {
        Document {
            id: id.to_string(),
            content: content.to_string(),
            metadata: DocumentMetadata {
                source: "test".to_string(),
                ..Default::default()
            },
            embedding: Some(embedding),
        }
    }

    #[tokio::test]
    async fn test_search_before_reset_is_retrieval_error() {
        let store = InMemoryVectorStore::new();
        let result = store.search(&[1.0, 0.0, 0.0], 3, 0.5).await;
        assert!(matches!(result, Err(AppError::Retrieval(_))));
    }

    #[tokio::test]
    async fn test_append_and_search() {
        let store = InMemoryVectorStore::new();
        store.reset(3).await.unwrap();

        let doc1 = create_test_document("doc1", "Hello world", vec![1.0, 0.0, 0.0]);
        let doc2 = create_test_document("doc2", "Goodbye world", vec![0.0, 1.0, 0.0]);
        let doc3 = create_test_document("doc3", "Hello again", vec![0.9, 0.1, 0.0]);

        store.append(&[doc1, doc2, doc3]).await.unwrap();

        // Search for documents similar to [1.0, 0.0, 0.0]
        let results = store.search(&[1.0, 0.0, 0.0], 10, 0.5).await.unwrap();

        assert_eq!(results.len(), 2); // doc1 and doc3 should match
        assert_eq!(results[0].document.id, "doc1"); // Exact match first
        assert_eq!(results[1].document.id, "doc3"); // Similar second
        assert!(results[0].score >= results[1].score);
        assert!(results[0].document.embedding.is_none());
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let store = InMemoryVectorStore::new();
        store.reset(2).await.unwrap();

        let docs: Vec<Document> = (0..5)
            .map(|i| create_test_document(&format!("doc{}", i), "text", vec![1.0, 0.0]))
            .collect();
        store.append(&docs).await.unwrap();

        let results = store.search(&[1.0, 0.0], 3, 0.0).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_threshold_filters_everything() {
        let store = InMemoryVectorStore::new();
        store.reset(2).await.unwrap();

        let doc = create_test_document("doc1", "text", vec![0.0, 1.0]);
        store.append(&[doc]).await.unwrap();

        // Orthogonal query, score 0.0 < threshold
        let results = store.search(&[1.0, 0.0], 3, 0.5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_reset_clears_previous_index() {
        let store = InMemoryVectorStore::new();
        store.reset(2).await.unwrap();
        store
            .append(&[create_test_document("doc1", "text", vec![1.0, 0.0])])
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        store.reset(2).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_append_without_embedding_fails() {
        let store = InMemoryVectorStore::new();
        store.reset(2).await.unwrap();

        let mut doc = create_test_document("doc1", "text", vec![1.0, 0.0]);
        doc.embedding = None;

        let result = store.append(&[doc]).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_cosine_similarity() {
        // Identical vectors
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 0.001);

        // Orthogonal vectors
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.001);

        // Opposite vectors
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 0.001);

        // Mismatched lengths
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
