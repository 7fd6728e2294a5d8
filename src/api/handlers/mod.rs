//! HTTP and websocket request handlers.

/// Websocket conversation gateway.
pub mod chat;
/// Conversation inspection endpoints.
pub mod conversations;
/// Liveness root.
pub mod health;
