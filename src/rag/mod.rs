//! Retrieval-augmented generation: embeddings, similarity retrieval, and
//! prompt assembly.

/// Embedding backends behind the `Embedder` trait.
pub mod embeddings;
/// Prompt templates and the structured reply contract.
pub mod prompt;
/// Query-time similarity search.
pub mod retriever;

pub use embeddings::{build_embedder, Embedder};
pub use prompt::{parse_bot_reply, replay_context, BotReply, PromptAssembler};
pub use retriever::Retriever;
