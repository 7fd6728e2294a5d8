//! Read-only conversation inspection endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::types::{Result, Turn};
use crate::AppState;

/// Ids of all currently open conversations.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActiveConversations {
    /// Open conversation identifiers, unordered.
    pub active_conversations: Vec<String>,
}

/// Stored history for one conversation.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationHistory {
    /// The conversation identifier.
    pub conversation_id: String,
    /// Ordered turn history, oldest first.
    pub history: Vec<Turn>,
}

/// List the ids of all open conversations.
#[utoipa::path(
    get,
    path = "/conversations",
    responses(
        (status = 200, description = "Open conversation ids", body = ActiveConversations)
    ),
    tag = "conversations"
)]
pub async fn list_conversations(State(state): State<AppState>) -> Json<ActiveConversations> {
    Json(ActiveConversations {
        active_conversations: state.sessions.active_ids(),
    })
}

/// Get the stored turn history for a conversation.
#[utoipa::path(
    get,
    path = "/conversations/{id}/history",
    params(
        ("id" = String, Path, description = "Conversation ID")
    ),
    responses(
        (status = 200, description = "Conversation history", body = ConversationHistory),
        (status = 404, description = "Conversation not found")
    ),
    tag = "conversations"
)]
pub async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationHistory>> {
    let history = state.sessions.history(&id)?;
    Ok(Json(ConversationHistory {
        conversation_id: id,
        history,
    }))
}
