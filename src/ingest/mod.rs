//! Offline corpus ingestion: load files, split them into chunks, embed the
//! chunks, and rebuild the vector index.
//!
//! The ingestion path runs to completion and exits; it never runs
//! concurrently with a serving process against the same index directory.

/// Overlapping fixed-size text windows.
pub mod chunker;
/// Batched embedding and index writes.
pub mod indexer;
/// Per-format file loaders.
pub mod loader;

pub use chunker::{split_documents, split_text};
pub use indexer::{ingest_corpus, Indexer};
pub use loader::{load_directory, load_file};
