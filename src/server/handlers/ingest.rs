use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::ApiError;
use crate::rag::loader;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IngestParams {
    /// Clears the store before ingesting when set.
    #[serde(rename = "override", default)]
    pub override_existing: bool,
}

/// `POST /ingest` - multipart upload of one PDF or text file.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Query(params): Query<IngestParams>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut uploaded: Option<(String, axum::body::Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(format!("invalid multipart payload: {err}")))?
    {
        if field.name() == Some("file") {
            let filename = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| ApiError::BadRequest("upload is missing a file name".to_string()))?;
            let data = field
                .bytes()
                .await
                .map_err(|err| ApiError::BadRequest(format!("could not read upload: {err}")))?;
            uploaded = Some((filename, data));
        }
    }

    let (filename, data) =
        uploaded.ok_or_else(|| ApiError::BadRequest("multipart field 'file' is required".to_string()))?;
    let filename = sanitize_filename(&filename)?;

    let target = state.paths.upload_dir.join(&filename);
    tokio::fs::write(&target, &data)
        .await
        .map_err(ApiError::internal)?;

    let docs = loader::load_document_chunks(&target, &state.chunker)?;
    let added = state
        .store
        .add_documents(docs, params.override_existing)
        .await?;
    tracing::info!(filename = %filename, chunks = added, "ingested document");

    Ok(Json(json!({
        "status": "success",
        "filename": filename,
        "chunks_added": added
    })))
}

/// Uploads are stored under the upload dir by their client-supplied name;
/// reject anything that could escape it.
fn sanitize_filename(name: &str) -> Result<String, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.contains("..")
    {
        return Err(ApiError::BadRequest("invalid file name".to_string()));
    }
    Ok(trimmed.to_string())
}
