//! Environment-driven configuration.
//!
//! Everything is read once at startup via [`Config::from_env`]. The `.env`
//! file (if any) is loaded by `main` before this runs.

use std::env;

use crate::types::{AppError, Result};

/// Top-level configuration for both the ingestion and serving paths.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP/websocket server settings.
    pub server: ServerConfig,
    /// Groq endpoint settings.
    pub llm: LlmConfig,
    /// Embedding backend settings.
    pub embedding: EmbeddingConfig,
    /// Chunking and retrieval settings.
    pub rag: RagConfig,
}

/// Bind address for the gateway.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind, default `127.0.0.1`.
    pub host: String,
    /// Port to bind, default `8000`.
    pub port: u16,
}

/// Settings for the hosted completion endpoint.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Groq API key. Absence is fatal for `serve`, but `ingest` does not
    /// need it.
    pub groq_api_key: Option<String>,
    /// OpenAI-compatible base URL, default Groq's.
    pub api_base: String,
    /// Model identifier sent with every completion request.
    pub model: String,
}

/// Settings for the embedding backend.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Which backend to use: `ollama` or `local`.
    pub provider: String,
    /// Ollama server URL (ollama backend only).
    pub ollama_url: String,
    /// Embedding model name (ollama backend only).
    pub model: String,
    /// Output dimensionality of the embedding model.
    pub dimensions: usize,
}

/// Chunking, batching, and retrieval constants.
#[derive(Debug, Clone)]
pub struct RagConfig {
    /// Corpus directory walked by `ingest`.
    pub data_path: String,
    /// Vector index directory, shared by `ingest` and `serve`.
    pub index_path: String,
    /// Target chunk length in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
    /// Chunks embedded and persisted per index write.
    pub max_batch_size: usize,
    /// Results returned per retrieval.
    pub top_k: usize,
    /// Minimum similarity score for a chunk to be retrieved.
    pub score_threshold: f32,
    /// System role line that opens every prompt.
    pub system_role: String,
}

const DEFAULT_SYSTEM_ROLE: &str =
    "You are a chatbot to answer questions related to developer documentations for Aptos.";

impl Config {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Configuration`] when a numeric variable fails to
    /// parse. A missing `GROQ_API_KEY` is not an error here; the serving
    /// path checks for it at startup.
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: parse_var("PORT", 8000)?,
            },
            llm: LlmConfig {
                groq_api_key: env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty()),
                api_base: env::var("GROQ_API_BASE")
                    .unwrap_or_else(|_| "https://api.groq.com/openai/v1".to_string()),
                model: env::var("GROQ_MODEL")
                    .unwrap_or_else(|_| "mixtral-8x7b-32768".to_string()),
            },
            embedding: EmbeddingConfig {
                provider: env::var("EMBEDDING_PROVIDER").unwrap_or_else(|_| "ollama".to_string()),
                ollama_url: env::var("OLLAMA_URL")
                    .unwrap_or_else(|_| "http://localhost:11434".to_string()),
                model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "nomic-embed-text".to_string()),
                dimensions: parse_var("EMBEDDING_DIMENSIONS", 768)?,
            },
            rag: RagConfig {
                data_path: env::var("DATA_PATH").unwrap_or_else(|_| "data/docs".to_string()),
                index_path: env::var("INDEX_PATH").unwrap_or_else(|_| "data/index".to_string()),
                chunk_size: parse_var("CHUNK_SIZE", 300)?,
                chunk_overlap: parse_var("CHUNK_OVERLAP", 100)?,
                max_batch_size: parse_var("MAX_BATCH_SIZE", 160)?,
                top_k: parse_var("TOP_K", 3)?,
                score_threshold: parse_var("SCORE_THRESHOLD", 0.5)?,
                system_role: env::var("SYSTEM_ROLE")
                    .unwrap_or_else(|_| DEFAULT_SYSTEM_ROLE.to_string()),
            },
        })
    }

    /// The API key, or a configuration error telling the operator how to
    /// supply it. The query path calls this at startup.
    pub fn require_groq_api_key(&self) -> Result<&str> {
        self.llm.groq_api_key.as_deref().ok_or_else(|| {
            AppError::Configuration(
                "GROQ_API_KEY not found in environment variables".to_string(),
            )
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| {
            AppError::Configuration(format!("Invalid value for {}: {}", name, raw))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Only exercises defaults for variables that are unlikely to be set
        // in a test environment.
        let config = Config::from_env().unwrap();
        assert_eq!(config.rag.chunk_size, 300);
        assert_eq!(config.rag.chunk_overlap, 100);
        assert_eq!(config.rag.max_batch_size, 160);
        assert_eq!(config.rag.top_k, 3);
        assert!((config.rag.score_threshold - 0.5).abs() < f32::EPSILON);
        assert!(config.rag.system_role.contains("Aptos"));
    }

    #[test]
    fn test_missing_api_key_is_reported() {
        let config = Config {
            llm: LlmConfig {
                groq_api_key: None,
                api_base: String::new(),
                model: String::new(),
            },
            ..Config::from_env().unwrap()
        };
        let err = config.require_groq_api_key().unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }
}
