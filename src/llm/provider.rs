use async_trait::async_trait;

use crate::core::ApiError;

use super::types::ChatRequest;

/// Chat completion backends.
///
/// Unlike embeddings there is no fallback chain here: a failed call surfaces
/// to the caller unchanged.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, ApiError>;
}
