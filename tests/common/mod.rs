//! Shared test doubles: a deterministic embedder, scripted LLM clients,
//! and an `AppState` factory wired to an in-memory index.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use docbot::{
    config::Config,
    db::{InMemoryVectorStore, VectorStore},
    llm::LLMClient,
    rag::Embedder,
    types::{AppError, Document, DocumentMetadata, Result},
    AppState,
};

/// Deterministic two-dimensional embedder: texts mentioning "aptos" point
/// one way, everything else points the other.
pub struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn provider_name(&self) -> &'static str {
        "keyword"
    }

    fn dimensions(&self) -> usize {
        2
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                if t.to_lowercase().contains("aptos") {
                    vec![1.0, 0.0]
                } else {
                    vec![0.0, 1.0]
                }
            })
            .collect())
    }
}

/// LLM double that records every prompt and replies with a fixed,
/// contract-conforming JSON body.
pub struct ScriptedLlm {
    pub prompts: Arc<Mutex<Vec<String>>>,
    response: String,
}

impl ScriptedLlm {
    pub fn new(answer: &str) -> Self {
        let response = serde_json::json!({
            "response": answer,
            "questions": ["One?", "Two?", "Three?"],
        })
        .to_string();
        Self {
            prompts: Arc::new(Mutex::new(Vec::new())),
            response,
        }
    }

    /// A double whose reply violates the JSON contract.
    pub fn malformed(raw: &str) -> Self {
        Self {
            prompts: Arc::new(Mutex::new(Vec::new())),
            response: raw.to_string(),
        }
    }
}

#[async_trait]
impl LLMClient for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// LLM double that always fails.
pub struct FailingLlm;

#[async_trait]
impl LLMClient for FailingLlm {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(AppError::Llm("backend unavailable".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

pub fn chunk(id: &str, content: &str, embedding: Vec<f32>) -> Document {
    Document {
        id: id.to_string(),
        content: content.to_string(),
        metadata: DocumentMetadata {
            source: "test".to_string(),
            ..Default::default()
        },
        embedding: Some(embedding),
    }
}

/// Build app state over an in-memory index seeded with one Aptos chunk.
pub async fn seeded_state(llm: Arc<dyn LLMClient>) -> AppState {
    let store = Arc::new(InMemoryVectorStore::new());
    store.reset(2).await.unwrap();
    store
        .append(&[chunk(
            "docs/move.md:0",
            "Aptos smart contracts are written in the Move language.",
            vec![1.0, 0.0],
        )])
        .await
        .unwrap();

    let config = Config::from_env().unwrap();
    AppState::new(config, Arc::new(KeywordEmbedder), store, llm)
}
