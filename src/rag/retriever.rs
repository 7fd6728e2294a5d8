//! Query-time retrieval: embed the query, search the index.

use std::sync::Arc;

use tracing::debug;

use crate::config::RagConfig;
use crate::db::VectorStore;
use crate::rag::Embedder;
use crate::types::{AppError, Result, SearchResult};

/// Finds the stored chunks most relevant to a query.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
    score_threshold: f32,
}

impl Retriever {
    /// Wire a retriever over an embedder and a vector store.
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, config: &RagConfig) -> Self {
        Self {
            embedder,
            store,
            top_k: config.top_k,
            score_threshold: config.score_threshold,
        }
    }

    /// Return up to `top_k` chunks scoring at or above the threshold,
    /// best-first. An empty result is a valid outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Embedding`] if the query cannot be embedded and
    /// [`AppError::Retrieval`] if the index is missing or unreadable.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        let embeddings = self.embedder.embed(&[query.to_string()]).await?;
        let embedding = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Embedding("embedder returned no vector for query".to_string()))?;

        let results = self
            .store
            .search(&embedding, self.top_k, self.score_threshold)
            .await?;

        debug!(
            results = results.len(),
            top_score = results.first().map(|r| r.score).unwrap_or(0.0),
            "Retrieval complete"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryVectorStore;
    use crate::types::{Document, DocumentMetadata};
    use async_trait::async_trait;

    /// Maps fixed phrases to fixed unit vectors.
    struct PhraseEmbedder;

    #[async_trait]
    impl Embedder for PhraseEmbedder {
        fn provider_name(&self) -> &'static str {
            "phrase"
        }

        fn dimensions(&self) -> usize {
            2
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    if t.contains("move") {
                        vec![1.0, 0.0]
                    } else {
                        vec![0.0, 1.0]
                    }
                })
                .collect())
        }
    }

    fn config() -> RagConfig {
        RagConfig {
            data_path: String::new(),
            index_path: String::new(),
            chunk_size: 300,
            chunk_overlap: 100,
            max_batch_size: 160,
            top_k: 3,
            score_threshold: 0.5,
            system_role: String::new(),
        }
    }

    fn doc(id: &str, content: &str, embedding: Vec<f32>) -> Document {
        Document {
            id: id.to_string(),
            content: content.to_string(),
            metadata: DocumentMetadata::default(),
            embedding: Some(embedding),
        }
    }

    #[tokio::test]
    async fn test_retrieve_matches_by_similarity() {
        let store = Arc::new(InMemoryVectorStore::new());
        store.reset(2).await.unwrap();
        store
            .append(&[
                doc("a", "Move modules", vec![1.0, 0.0]),
                doc("b", "Cooking pasta", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let retriever = Retriever::new(Arc::new(PhraseEmbedder), store, &config());
        let results = retriever.retrieve("what is move?").await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.id, "a");
    }

    #[tokio::test]
    async fn test_retrieve_below_threshold_is_empty_not_error() {
        let store = Arc::new(InMemoryVectorStore::new());
        store.reset(2).await.unwrap();
        store
            .append(&[doc("a", "Move modules", vec![1.0, 0.0])])
            .await
            .unwrap();

        let retriever = Retriever::new(Arc::new(PhraseEmbedder), store, &config());
        let results = retriever.retrieve("unrelated").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_missing_index_surfaces_retrieval_error() {
        let store = Arc::new(InMemoryVectorStore::new());
        let retriever = Retriever::new(Arc::new(PhraseEmbedder), store, &config());

        let result = retriever.retrieve("what is move?").await;
        assert!(matches!(result, Err(AppError::Retrieval(_))));
    }
}
