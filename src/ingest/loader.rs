//! Corpus loading.
//!
//! One loader per file extension. Directory walking isolates per-file
//! failures: a file that cannot be loaded is logged and skipped, and the
//! run continues with the rest of the corpus.

use std::path::Path;

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::types::{AppError, Document, DocumentMetadata, Result};

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

/// Load every supported file under `root`, skipping hidden entries.
///
/// Blocking; callers on the async runtime should wrap this in
/// `spawn_blocking`.
///
/// # Errors
///
/// Returns [`AppError::Ingestion`] only when the root directory itself is
/// unreadable. Per-file failures are logged and skipped.
pub fn load_directory(root: &Path) -> Result<Vec<Document>> {
    if !root.is_dir() {
        return Err(AppError::Ingestion(format!(
            "corpus directory not found: {}",
            root.display()
        )));
    }

    let mut documents = Vec::new();
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        match load_file(entry.path()) {
            Ok(mut docs) => {
                debug!(path = %entry.path().display(), documents = docs.len(), "Loaded file");
                documents.append(&mut docs);
            }
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Skipping file");
            }
        }
    }

    Ok(documents)
}

/// Load one file into documents: one per file for text formats, one per
/// page for PDF, one per row for CSV.
///
/// # Errors
///
/// Returns [`AppError::UnsupportedFormat`] for an extension no loader
/// handles and [`AppError::Ingestion`] when the file cannot be read.
pub fn load_file(path: &Path) -> Result<Vec<Document>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "txt" | "md" | "mdx" | "markdown" => load_text(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        "pdf" => load_pdf(path),
        other => Err(AppError::UnsupportedFormat(format!(
            "no loader for '.{}' ({})",
            other,
            path.display()
        ))),
    }
}

fn load_text(path: &Path) -> Result<Vec<Document>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::Ingestion(format!("failed to read {}: {}", path.display(), e)))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(vec![Document {
        id: path.display().to_string(),
        content,
        metadata: DocumentMetadata {
            source: path.display().to_string(),
            ..Default::default()
        },
        embedding: None,
    }])
}

fn load_json(path: &Path) -> Result<Vec<Document>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::Ingestion(format!("failed to read {}: {}", path.display(), e)))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| AppError::Ingestion(format!("invalid JSON in {}: {}", path.display(), e)))?;
    // Pretty-printing normalizes the text regardless of source formatting.
    let content = serde_json::to_string_pretty(&value)
        .map_err(|e| AppError::Ingestion(format!("failed to render {}: {}", path.display(), e)))?;

    Ok(vec![Document {
        id: path.display().to_string(),
        content,
        metadata: DocumentMetadata {
            source: path.display().to_string(),
            ..Default::default()
        },
        embedding: None,
    }])
}

fn load_csv(path: &Path) -> Result<Vec<Document>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| AppError::Ingestion(format!("failed to open {}: {}", path.display(), e)))?;
    let headers = reader
        .headers()
        .map_err(|e| AppError::Ingestion(format!("failed to read CSV headers: {}", e)))?
        .clone();

    let mut documents = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            AppError::Ingestion(format!("bad CSV row {} in {}: {}", row, path.display(), e))
        })?;
        let content: Vec<String> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| format!("{}: {}", header, value))
            .collect();
        documents.push(Document {
            id: format!("{}:row{}", path.display(), row),
            content: content.join("\n"),
            metadata: DocumentMetadata {
                source: path.display().to_string(),
                ..Default::default()
            },
            embedding: None,
        });
    }
    Ok(documents)
}

fn load_pdf(path: &Path) -> Result<Vec<Document>> {
    let pages = pdf_extract::extract_text_by_pages(path)
        .map_err(|e| AppError::Ingestion(format!("failed to extract {}: {}", path.display(), e)))?;

    Ok(pages
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(i, text)| {
            let page = (i + 1) as u32;
            Document {
                id: format!("{}:page{}", path.display(), page),
                content: text,
                metadata: DocumentMetadata {
                    source: path.display().to_string(),
                    page: Some(page),
                    start_index: None,
                },
                embedding: None,
            }
        })
        .collect())
}
