use async_trait::async_trait;

use super::error::EmbedError;

/// One embedding strategy in the fallback chain.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Embeds one batch of texts, returning one vector per input, in input
    /// order.
    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}
