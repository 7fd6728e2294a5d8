//! Liveness root.

use axum::Json;
use serde_json::{json, Value};

/// Liveness check.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Server is running")
    ),
    tag = "health"
)]
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "docbot websocket server running" }))
}
