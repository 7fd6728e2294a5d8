//! # docbot - Retrieval-Augmented Documentation Chatbot
//!
//! A websocket chatbot server that answers questions about a documentation
//! corpus. Offline, the `ingest` command loads the corpus, splits it into
//! overlapping chunks, embeds them, and rebuilds a local vector index.
//! Online, each websocket connection owns a conversation: every query is
//! replayed with the conversation so far, matched against the index, and
//! answered by a Groq-hosted model under a strict JSON reply contract.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docbot::{
//!     config::Config,
//!     db::DiskVectorStore,
//!     llm::GroqClient,
//!     rag::build_embedder,
//!     AppState,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let embedder = build_embedder(&config.embedding)?;
//!     let store = Arc::new(DiskVectorStore::new(&config.rag.index_path));
//!     let llm = Arc::new(GroqClient::new(
//!         config.require_groq_api_key()?.to_string(),
//!         config.llm.api_base.clone(),
//!         config.llm.model.clone(),
//!     ));
//!
//!     let state = AppState::new(config, embedder, store, llm);
//!     let app = docbot::app(state);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod ingest;
pub mod llm;
pub mod rag;
pub mod session;
pub mod types;

use std::sync::Arc;

use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::db::VectorStore;
use crate::llm::LLMClient;
use crate::rag::{Embedder, PromptAssembler, Retriever};
use crate::session::SessionStore;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Startup configuration.
    pub config: Arc<Config>,
    /// Live conversation registry.
    pub sessions: Arc<SessionStore>,
    /// Query-time retrieval over the vector index.
    pub retriever: Arc<Retriever>,
    /// Prompt construction.
    pub assembler: Arc<PromptAssembler>,
    /// Hosted completion endpoint.
    pub llm: Arc<dyn LLMClient>,
}

impl AppState {
    /// Assemble application state from its backends.
    pub fn new(
        config: Config,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        llm: Arc<dyn LLMClient>,
    ) -> Self {
        let retriever = Arc::new(Retriever::new(embedder, store, &config.rag));
        let assembler = Arc::new(PromptAssembler::new(config.rag.system_role.clone()));
        Self {
            config: Arc::new(config),
            sessions: Arc::new(SessionStore::new()),
            retriever,
            assembler,
            llm,
        }
    }
}

/// Build the axum application with tracing and permissive CORS.
pub fn app(state: AppState) -> axum::Router {
    api::create_router()
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
