//! Core types shared across the crate: documents, retrieval results,
//! conversation turns, and the application error type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= Document Types =============

/// A loaded document or a chunk of one.
///
/// Loaders produce one `Document` per file (or per page / CSV row); the
/// chunker splits those into smaller `Document`s that carry the parent
/// metadata plus a `start_index`. Embeddings are attached at indexing time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier. Chunk ids are `{parent_id}:{start_index}`.
    pub id: String,
    /// The document text.
    pub content: String,
    /// Provenance metadata.
    pub metadata: DocumentMetadata,
    /// Embedding vector, present only between embedding and indexing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// Provenance metadata attached to every document and chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Path (or other identifier) of the source the text came from.
    pub source: String,
    /// Page number, for paginated sources (PDF).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Character offset of a chunk within its parent document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<usize>,
}

/// A retrieved chunk with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matching chunk (embedding stripped).
    pub document: Document,
    /// Similarity score in `[0, 1]`, higher is better.
    pub score: f32,
}

// ============= Conversation Types =============

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// A message sent by the connected client.
    User,
    /// A reply produced by the generation pipeline.
    Bot,
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnRole::User => write!(f, "User"),
            TurnRole::Bot => write!(f, "Bot"),
        }
    }
}

/// One message in a conversation, appended in strict arrival order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Turn {
    /// Who produced this turn.
    pub role: TurnRole,
    /// The message text.
    pub text: String,
}

impl Turn {
    /// A turn sent by the client.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    /// A turn produced by the pipeline.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Bot,
            text: text.into(),
        }
    }
}

/// Live conversation state for one websocket connection.
///
/// Created when the connection is accepted, removed on disconnect.
/// Never persisted: lifetime is bounded by the process and the connection.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConversationSession {
    /// Opaque unique identifier (UUIDv4).
    pub id: String,
    /// When the connection was accepted.
    pub created_at: DateTime<Utc>,
    /// Ordered turn history, oldest first.
    pub history: Vec<Turn>,
}

// ============= Error Types =============

/// Application error type covering every failure domain of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Corpus loading or index writing failed; aborts the ingestion run.
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// A file extension no loader is registered for.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Missing or corrupt vector index, or a search failure.
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Embedding backend failure.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// LLM endpoint failure (auth, quota, network, unknown model).
    #[error("LLM error: {0}")]
    Llm(String),

    /// Lookup for an unknown identifier.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed caller input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing or invalid environment configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Anything that should not happen.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, message) = match self {
            AppError::Ingestion(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::UnsupportedFormat(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Retrieval(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Embedding(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Llm(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Configuration(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AppError>;
