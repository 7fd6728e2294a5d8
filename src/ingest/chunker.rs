//! Fixed-size overlapping text windows.
//!
//! Splitting is a pure transform: deterministic for a given input and
//! configuration, order-preserving, and offset-tracking. Offsets and sizes
//! are counted in characters, not bytes, so multi-byte text never splits
//! inside a code point.

use crate::types::{AppError, Document, DocumentMetadata, Result};

/// Split every document into overlapping chunks.
///
/// Chunk ids are `{parent_id}:{start_offset}` and each chunk carries the
/// parent's metadata plus its start offset.
///
/// # Errors
///
/// Returns [`AppError::InvalidInput`] for a zero chunk size or an overlap
/// that is not smaller than the chunk size.
pub fn split_documents(
    documents: &[Document],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<Document>> {
    let mut chunks = Vec::new();
    for doc in documents {
        for (start, text) in split_text(&doc.content, chunk_size, chunk_overlap)? {
            chunks.push(Document {
                id: format!("{}:{}", doc.id, start),
                content: text,
                metadata: DocumentMetadata {
                    source: doc.metadata.source.clone(),
                    page: doc.metadata.page,
                    start_index: Some(start),
                },
                embedding: None,
            });
        }
    }
    Ok(chunks)
}

/// Split one text into `(start_offset, chunk)` windows.
///
/// Consecutive windows overlap by exactly `chunk_overlap` characters,
/// except that the final window may be shorter. Whitespace-only windows
/// are dropped so no chunk is ever empty.
pub fn split_text(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<(usize, String)>> {
    if chunk_size == 0 {
        return Err(AppError::InvalidInput("chunk size must be non-zero".to_string()));
    }
    if chunk_overlap >= chunk_size {
        return Err(AppError::InvalidInput(format!(
            "chunk overlap ({}) must be smaller than chunk size ({})",
            chunk_overlap, chunk_size
        )));
    }

    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size - chunk_overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = usize::min(start + chunk_size, chars.len());
        let window: String = chars[start..end].iter().collect();
        if !window.trim().is_empty() {
            chunks.push((start, window));
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }

    Ok(chunks)
}
