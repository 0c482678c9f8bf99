use std::sync::Arc;

use crate::core::config::EmbeddingsConfig;

use super::error::EmbedError;
use super::local::LocalEmbeddingProvider;
use super::provider::EmbeddingProvider;
use super::remote::RemoteEmbeddingProvider;

/// Ordered list of embedding strategies.
///
/// Each batch is tried against the providers in order; the first success
/// wins. A non-final provider failing is a fallback event, logged and
/// recovered. The final provider failing fails the whole call.
pub struct EmbeddingChain {
    providers: Vec<Arc<dyn EmbeddingProvider>>,
    batch_size: usize,
}

impl EmbeddingChain {
    pub fn new(providers: Vec<Arc<dyn EmbeddingProvider>>, batch_size: usize) -> Self {
        Self {
            providers,
            batch_size: batch_size.max(1),
        }
    }

    /// Builds the chain from configuration: remote endpoint first when
    /// enabled, local model always last.
    pub fn from_config(config: &EmbeddingsConfig) -> Result<Self, EmbedError> {
        let mut providers: Vec<Arc<dyn EmbeddingProvider>> = Vec::new();
        if config.use_remote {
            providers.push(Arc::new(RemoteEmbeddingProvider::new(config)?));
        }
        providers.push(Arc::new(LocalEmbeddingProvider::new(
            config.local_model.clone(),
        )));
        Ok(Self::new(providers, config.batch_size))
    }

    /// Embeds `texts`, preserving input order across batches.
    ///
    /// The result always has exactly one vector per input and a single
    /// dimensionality; anything else is an invariant breach surfaced as an
    /// error.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.embed_batch(batch).await?);
        }

        if vectors.len() != texts.len() {
            return Err(EmbedError::CountMismatch {
                expected: texts.len(),
                actual: vectors.len(),
            });
        }
        if let Some(first) = vectors.first() {
            let dim = first.len();
            if let Some(odd) = vectors.iter().find(|v| v.len() != dim) {
                return Err(EmbedError::DimensionMismatch {
                    expected: dim,
                    actual: odd.len(),
                });
            }
        }

        Ok(vectors)
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let mut last_error =
            EmbedError::Configuration("no embedding providers configured".to_string());

        for (position, provider) in self.providers.iter().enumerate() {
            match provider.embed_batch(batch).await {
                Ok(vectors) if vectors.len() == batch.len() => {
                    tracing::info!(
                        provider = provider.name(),
                        size = batch.len(),
                        fallback = (position > 0),
                        "embedded batch"
                    );
                    return Ok(vectors);
                }
                Ok(vectors) => {
                    last_error = EmbedError::CountMismatch {
                        expected: batch.len(),
                        actual: vectors.len(),
                    };
                    tracing::warn!(
                        provider = provider.name(),
                        "embedding batch failed: {}",
                        last_error
                    );
                }
                Err(err) => {
                    tracing::warn!(provider = provider.name(), "embedding batch failed: {}", err);
                    last_error = err;
                }
            }
            if position + 1 < self.providers.len() {
                tracing::info!("falling back to next embedding provider for this batch");
            }
        }

        Err(last_error)
    }
}
