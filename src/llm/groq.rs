//! Groq chat-completion client.
//!
//! Groq exposes an OpenAI-compatible API, so this rides on `async-openai`
//! with the base URL pointed at Groq.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::debug;

use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};

/// Model identifiers known to work, listed in error messages so a
/// misconfigured deployment is easy to fix.
pub const KNOWN_MODELS: &[&str] = &["mixtral-8x7b-32768", "llama2-70b-4096", "gemma-7b-it"];

/// Client for Groq's hosted completion endpoint.
pub struct GroqClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl GroqClient {
    /// Build a client for `api_base` with the given key and model.
    pub fn new(api_key: String, api_base: String, model: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);

        Self {
            client: Client::with_config(config),
            model,
        }
    }

    fn describe_failure(&self, error: impl std::fmt::Display) -> AppError {
        let mut message = format!("Error accessing Groq API: {}", error);
        message.push_str("\n\nAvailable Groq models include:");
        for model in KNOWN_MODELS {
            message.push_str(&format!("\n- {}", model));
        }
        AppError::Llm(message)
    }
}

#[async_trait]
impl LLMClient for GroqClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage::from(prompt.to_string()),
            )])
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to build request: {}", e)))?;

        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending completion request");

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| self.describe_failure(e))?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::Llm("No response from Groq".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
