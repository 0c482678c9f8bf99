use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatApiRequest {
    pub query: String,
    pub conversation_id: Option<String>,
    pub top_k: Option<i64>,
}

/// `POST /chat` - answers a query against the ingested corpus.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatApiRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.query.trim().is_empty() {
        return Err(ApiError::BadRequest("Query cannot be empty.".to_string()));
    }

    let top_k = match payload.top_k {
        Some(k) if k <= 0 => 0,
        Some(k) => k as usize,
        None => state.config.retrieval.top_k,
    };

    let answer = state
        .engine
        .answer_query(&payload.query, payload.conversation_id.as_deref(), top_k)
        .await?;

    Ok(Json(json!({ "answer": answer })))
}
