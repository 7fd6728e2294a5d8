//! The websocket conversation gateway.
//!
//! One task per accepted connection. The loop is strictly sequential for a
//! given conversation: receive a text frame, append the user turn, run the
//! retrieval pipeline, append and send the bot turn. A pipeline failure is
//! sent to the client as the bot turn; the connection stays open.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use tracing::{debug, info, warn};

use crate::rag::{parse_bot_reply, replay_context};
use crate::types::{AppError, Result, Turn};
use crate::AppState;

/// Upgrade the connection and start a conversation.
pub async fn websocket(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let conversation_id = state.sessions.create();
    info!(conversation_id = %conversation_id, "Conversation opened");

    while let Some(message) = socket.recv().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                debug!(conversation_id = %conversation_id, error = %e, "Transport error");
                break;
            }
        };

        match message {
            Message::Text(text) => {
                let query = text.to_string();
                debug!(conversation_id = %conversation_id, chars = query.len(), "Received query");

                if state
                    .sessions
                    .append(&conversation_id, Turn::user(query.clone()))
                    .is_err()
                {
                    break;
                }

                let reply = match answer(&state, &conversation_id, &query).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        warn!(conversation_id = %conversation_id, error = %e, "Query failed");
                        e.to_string()
                    }
                };

                if state
                    .sessions
                    .append(&conversation_id, Turn::bot(reply.clone()))
                    .is_err()
                {
                    break;
                }
                if socket.send(Message::Text(reply.into())).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            // Pings are answered by axum; binary frames are ignored.
            _ => {}
        }
    }

    state.sessions.remove(&conversation_id);
    info!(conversation_id = %conversation_id, "Conversation closed");
}

/// Run one query through the retrieval pipeline and validate the reply.
///
/// The whole conversation so far (including the just-appended user turn)
/// is replayed into the retrieval query so follow-up questions resolve
/// against earlier turns.
async fn answer(state: &AppState, conversation_id: &str, query: &str) -> Result<String> {
    let history = state.sessions.history(conversation_id)?;
    let context = replay_context(&history, query);

    let results = state.retriever.retrieve(&context).await?;
    let prompt = state.assembler.assemble(&results, &context);
    let raw = state.llm.generate(&prompt).await?;

    let reply = parse_bot_reply(&raw)?;
    serde_json::to_string(&reply)
        .map_err(|e| AppError::Internal(format!("failed to encode reply: {}", e)))
}
