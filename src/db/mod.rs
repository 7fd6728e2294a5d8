//! Vector index backends.
//!
//! The ingestion path writes the index through [`VectorStore::reset`] and
//! [`VectorStore::append`]; the query path reads it through
//! [`VectorStore::search`]. The on-disk backend is the production default;
//! the in-memory backend exists for tests.

/// Persisted on-disk vector index.
pub mod disk;
/// The `VectorStore` trait and the in-memory test backend.
pub mod vectorstore;

pub use disk::DiskVectorStore;
pub use vectorstore::{InMemoryVectorStore, VectorStore};
