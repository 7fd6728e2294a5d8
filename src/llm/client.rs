//! LLM client abstraction.
//!
//! The pipeline only ever sends one prompt string and reads one text
//! reply, so the trait surface is deliberately small. The production
//! implementation is [`super::GroqClient`]; tests substitute scripted
//! clients.

use async_trait::async_trait;

use crate::types::Result;

/// A hosted completion endpoint.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt.
    ///
    /// # Errors
    ///
    /// Failures (auth, quota, network, unknown model) carry a
    /// human-readable message; the call is never retried here.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier sent with each request.
    fn model_name(&self) -> &str;
}
