use std::path::Path;

use serde_json::json;

use crate::core::ApiError;

use super::chunker::Chunker;
use super::store::DocumentInput;

/// Reads a source file, chunks it, and builds ingestion inputs.
///
/// PDF files go through text extraction; everything else is treated as UTF-8
/// text with invalid sequences ignored. Chunk ids are deterministic:
/// `<file name>_<index>`.
pub fn load_document_chunks(path: &Path, chunker: &Chunker) -> Result<Vec<DocumentInput>, ApiError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| ApiError::BadRequest("document path has no file name".to_string()))?;

    let raw = if file_name.to_ascii_lowercase().ends_with(".pdf") {
        extract_pdf_text(path)?
    } else {
        read_text_lossy(path)?
    };

    let docs = chunker
        .chunk(&raw)
        .into_iter()
        .enumerate()
        .map(|(index, text)| DocumentInput {
            id: format!("{}_{}", file_name, index),
            text,
            metadata: json!({ "source": file_name.as_str() }),
        })
        .collect();

    Ok(docs)
}

fn extract_pdf_text(path: &Path) -> Result<String, ApiError> {
    pdf_extract::extract_text(path)
        .map_err(|err| ApiError::BadRequest(format!("could not extract PDF text: {err}")))
}

fn read_text_lossy(path: &Path) -> Result<String, ApiError> {
    let bytes = std::fs::read(path).map_err(ApiError::internal)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
