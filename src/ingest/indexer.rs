//! Batched index building.
//!
//! Indexing destructively replaces any previous index: the store is reset
//! before the first batch, then chunks are embedded and appended in
//! fixed-size batches so arbitrarily large corpora bound the embedding
//! payload size. A failed batch aborts the run; no cleanup is attempted.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::config::RagConfig;
use crate::db::VectorStore;
use crate::ingest::{chunker, loader};
use crate::rag::Embedder;
use crate::types::{AppError, Document, Result};

/// Embeds chunks and writes them to the vector store.
pub struct Indexer {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    batch_size: usize,
}

impl Indexer {
    /// Wire an indexer over an embedder and a vector store.
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, batch_size: usize) -> Self {
        Self {
            embedder,
            store,
            batch_size,
        }
    }

    /// Rebuild the index from `chunks`. Returns the number indexed.
    ///
    /// # Errors
    ///
    /// Embedding and index-write failures abort the run and leave a
    /// partial index behind; re-running ingestion replaces it.
    pub async fn index(&self, chunks: Vec<Document>) -> Result<usize> {
        self.store.reset(self.embedder.dimensions()).await?;

        let mut indexed = 0;
        for batch in chunks.chunks(self.batch_size.max(1)) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.embedder.embed(&texts).await?;
            if embeddings.len() != batch.len() {
                return Err(AppError::Embedding(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    embeddings.len()
                )));
            }

            let embedded: Vec<Document> = batch
                .iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| Document {
                    embedding: Some(embedding),
                    ..chunk.clone()
                })
                .collect();

            indexed += self.store.append(&embedded).await?;
            info!(indexed, total = chunks.len(), "Indexed batch");
        }

        Ok(indexed)
    }
}

/// The full offline ingestion pipeline: load, chunk, embed, index.
///
/// Returns `(documents_loaded, chunks_indexed)`.
///
/// # Errors
///
/// Returns an error when the corpus directory is unreadable, chunking
/// configuration is invalid, or embedding/indexing fails.
pub async fn ingest_corpus(
    config: &RagConfig,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
) -> Result<(usize, usize)> {
    let data_path = PathBuf::from(&config.data_path);
    info!(path = %data_path.display(), "Loading corpus");

    // Loaders do blocking file and PDF work.
    let documents = tokio::task::spawn_blocking(move || loader::load_directory(&data_path))
        .await
        .map_err(|e| AppError::Internal(format!("loader task failed: {}", e)))??;

    let chunks = chunker::split_documents(&documents, config.chunk_size, config.chunk_overlap)?;
    info!(
        documents = documents.len(),
        chunks = chunks.len(),
        "Corpus chunked"
    );

    let indexer = Indexer::new(embedder, store, config.max_batch_size);
    let indexed = indexer.index(chunks).await?;

    Ok((documents.len(), indexed))
}
