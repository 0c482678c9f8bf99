use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::core::config::EmbeddingsConfig;

use super::error::EmbedError;
use super::provider::EmbeddingProvider;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PROVIDER_NAME: &str = "gradient";

/// OpenAI-compatible `/v1/embeddings` client.
///
/// Every failure here is recoverable: the chain falls through to the local
/// model for the affected batch.
#[derive(Clone)]
pub struct RemoteEmbeddingProvider {
    api_base: String,
    api_key: Option<String>,
    model: Option<String>,
    client: Client,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

impl RemoteEmbeddingProvider {
    pub fn new(config: &EmbeddingsConfig) -> Result<Self, EmbedError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| EmbedError::Provider {
                provider: PROVIDER_NAME,
                message: format!("could not build http client: {err}"),
            })?;

        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            client,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbeddingProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            EmbedError::Configuration("remote embeddings api_key is not set".to_string())
        })?;
        let model = self.model.as_deref().ok_or_else(|| {
            EmbedError::Configuration("remote embeddings model is not set".to_string())
        })?;

        let url = format!("{}/v1/embeddings", self.api_base);
        let body = json!({ "model": model, "input": batch });

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| EmbedError::Provider {
                provider: PROVIDER_NAME,
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EmbedError::Provider {
                provider: PROVIDER_NAME,
                message: format!("status {}: {}", status, truncate_for_log(&text, 500)),
            });
        }

        let payload: EmbeddingsResponse =
            response.json().await.map_err(|err| EmbedError::Provider {
                provider: PROVIDER_NAME,
                message: format!("malformed response body: {err}"),
            })?;

        // A count mismatch means the response is not aligned with the input
        // and must be treated as a parse failure.
        if payload.data.len() != batch.len() {
            return Err(EmbedError::Provider {
                provider: PROVIDER_NAME,
                message: format!(
                    "{} embeddings returned for {} inputs",
                    payload.data.len(),
                    batch.len()
                ),
            });
        }

        Ok(payload.data.into_iter().map(|item| item.embedding).collect())
    }
}

fn truncate_for_log(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
