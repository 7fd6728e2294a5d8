//! Embedding backends.
//!
//! Two implementations: an Ollama-hosted model (default) and a local
//! fastembed model behind the `local-embeddings` feature. Both paths go
//! through [`Embedder`], so the indexer and retriever never know which one
//! is active.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::EmbeddingConfig;
use crate::types::{AppError, Result};

/// A model that turns text into fixed-size vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Get the name of this embedding backend.
    fn provider_name(&self) -> &'static str;

    /// Output dimensionality. The index is initialized with this value.
    fn dimensions(&self) -> usize;

    /// Embed a batch of texts, one vector per input, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Embedding`] if the backend call fails or returns
    /// the wrong number of vectors.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

impl std::fmt::Debug for dyn Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("provider", &self.provider_name())
            .field("dimensions", &self.dimensions())
            .finish()
    }
}

/// Construct the embedder selected by configuration.
///
/// # Errors
///
/// Returns [`AppError::Configuration`] for an unknown provider name or a
/// provider that was not compiled in.
pub fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    match config.provider.as_str() {
        #[cfg(feature = "ollama")]
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(
            &config.ollama_url,
            config.model.clone(),
            config.dimensions,
        ))),
        #[cfg(not(feature = "ollama"))]
        "ollama" => Err(AppError::Configuration(
            "ollama embedding support not compiled in (enable the `ollama` feature)".to_string(),
        )),
        #[cfg(feature = "local-embeddings")]
        "local" => Ok(Arc::new(FastEmbedder::new()?)),
        #[cfg(not(feature = "local-embeddings"))]
        "local" => Err(AppError::Configuration(
            "local embedding support not compiled in (enable the `local-embeddings` feature)"
                .to_string(),
        )),
        other => Err(AppError::Configuration(format!(
            "Unknown embedding provider: {}",
            other
        ))),
    }
}

// ============================================================================
// Ollama Embedder
// ============================================================================

/// Embeddings served by a local Ollama instance.
#[cfg(feature = "ollama")]
pub struct OllamaEmbedder {
    client: ollama_rs::Ollama,
    model: String,
    dimensions: usize,
}

#[cfg(feature = "ollama")]
impl OllamaEmbedder {
    /// Connect to the Ollama server at `base_url`.
    pub fn new(base_url: &str, model: String, dimensions: usize) -> Self {
        let url_parts: Vec<&str> = base_url.split("://").collect();
        let (host, port) = if url_parts.len() == 2 {
            let host_port: Vec<&str> = url_parts[1].split(':').collect();
            let host = host_port[0].to_string();
            let port = if host_port.len() == 2 {
                host_port[1].parse().unwrap_or(11434)
            } else {
                11434
            };
            (host, port)
        } else {
            ("localhost".to_string(), 11434)
        };

        Self {
            client: ollama_rs::Ollama::new(host, port),
            model,
            dimensions,
        }
    }
}

#[cfg(feature = "ollama")]
#[async_trait]
impl Embedder for OllamaEmbedder {
    fn provider_name(&self) -> &'static str {
        "ollama"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        use ollama_rs::generation::embeddings::request::{
            EmbeddingsInput, GenerateEmbeddingsRequest,
        };

        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = GenerateEmbeddingsRequest::new(
            self.model.clone(),
            EmbeddingsInput::Multiple(texts.to_vec()),
        );

        let response = self
            .client
            .generate_embeddings(request)
            .await
            .map_err(|e| AppError::Embedding(format!("Ollama error: {}", e)))?;

        if response.embeddings.len() != texts.len() {
            return Err(AppError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.embeddings.len()
            )));
        }

        Ok(response.embeddings)
    }
}

// ============================================================================
// Local Fastembed Embedder
// ============================================================================

/// Embeddings computed in-process with fastembed (all-MiniLM-L6-v2).
#[cfg(feature = "local-embeddings")]
pub struct FastEmbedder {
    // fastembed's embed takes &mut self.
    model: parking_lot::Mutex<fastembed::TextEmbedding>,
}

#[cfg(feature = "local-embeddings")]
impl FastEmbedder {
    /// Load the model, downloading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Embedding`] if the model cannot be initialized.
    pub fn new() -> Result<Self> {
        use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(true),
        )
        .map_err(|e| AppError::Embedding(e.to_string()))?;

        Ok(Self {
            model: parking_lot::Mutex::new(model),
        })
    }
}

#[cfg(feature = "local-embeddings")]
#[async_trait]
impl Embedder for FastEmbedder {
    fn provider_name(&self) -> &'static str {
        "fastembed"
    }

    fn dimensions(&self) -> usize {
        384
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        self.model
            .lock()
            .embed(texts.to_vec(), None)
            .map_err(|e| AppError::Embedding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_is_configuration_error() {
        let config = EmbeddingConfig {
            provider: "cloudx".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
        };
        let err = build_embedder(&config).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("cloudx"));
    }

    #[cfg(feature = "ollama")]
    #[test]
    fn test_ollama_embedder_reports_configured_dimensions() {
        let embedder = OllamaEmbedder::new(
            "http://localhost:11434",
            "nomic-embed-text".to_string(),
            768,
        );
        assert_eq!(embedder.dimensions(), 768);
        assert_eq!(embedder.provider_name(), "ollama");
    }
}
