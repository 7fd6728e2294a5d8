//! HTTP surface: route table and handlers.

/// Request handlers.
pub mod handlers;
/// Route table.
pub mod routes;

pub use routes::create_router;
