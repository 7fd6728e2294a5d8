//! Route table.

use axum::{routing::get, Router};

use crate::AppState;

/// Build the application router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(crate::api::handlers::health::root))
        .route("/ws", get(crate::api::handlers::chat::websocket))
        .route(
            "/conversations",
            get(crate::api::handlers::conversations::list_conversations),
        )
        .route(
            "/conversations/{id}/history",
            get(crate::api::handlers::conversations::get_history),
        )
}
