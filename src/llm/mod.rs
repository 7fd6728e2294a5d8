//! Hosted LLM access.

/// The `LLMClient` trait.
pub mod client;
/// Groq (OpenAI-compatible) implementation.
pub mod groq;

pub use client::LLMClient;
pub use groq::{GroqClient, KNOWN_MODELS};
