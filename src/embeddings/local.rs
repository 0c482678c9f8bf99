use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::error::EmbedError;
use super::provider::EmbeddingProvider;

const PROVIDER_NAME: &str = "fastembed";

/// In-process embedding fallback backed by fastembed ONNX models.
///
/// Model handles are loaded lazily and cached per model name. Loading and
/// inference both run on the blocking thread pool.
pub struct LocalEmbeddingProvider {
    model_name: String,
    models: Mutex<HashMap<String, Arc<Mutex<TextEmbedding>>>>,
}

impl LocalEmbeddingProvider {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            models: Mutex::new(HashMap::new()),
        }
    }

    async fn model_handle(&self) -> Result<Arc<Mutex<TextEmbedding>>, EmbedError> {
        if let Some(model) = self.models.lock().unwrap().get(&self.model_name).cloned() {
            return Ok(model);
        }

        let model_name = self.model_name.clone();
        let model = tokio::task::spawn_blocking(move || load_model(&model_name))
            .await
            .map_err(|err| EmbedError::Provider {
                provider: PROVIDER_NAME,
                message: err.to_string(),
            })??;

        let handle = Arc::new(Mutex::new(model));
        self.models
            .lock()
            .unwrap()
            .insert(self.model_name.clone(), handle.clone());
        Ok(handle)
    }
}

fn load_model(name: &str) -> Result<TextEmbedding, EmbedError> {
    let model = builtin_model(name).ok_or_else(|| {
        EmbedError::Configuration(format!("unknown local embedding model: {name}"))
    })?;

    tracing::info!("Loading local embedding model: {}", name);
    TextEmbedding::try_new(InitOptions::new(model).with_show_download_progress(false)).map_err(
        |err| EmbedError::Provider {
            provider: PROVIDER_NAME,
            message: err.to_string(),
        },
    )
}

fn builtin_model(name: &str) -> Option<EmbeddingModel> {
    match name {
        "sentence-transformers/all-MiniLM-L6-v2" => Some(EmbeddingModel::AllMiniLML6V2),
        "sentence-transformers/all-MiniLM-L12-v2" => Some(EmbeddingModel::AllMiniLML12V2),
        "BAAI/bge-small-en-v1.5" => Some(EmbeddingModel::BGESmallENV15),
        "BAAI/bge-base-en-v1.5" => Some(EmbeddingModel::BGEBaseENV15),
        "nomic-ai/nomic-embed-text-v1.5" => Some(EmbeddingModel::NomicEmbedTextV15),
        _ => None,
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbeddingProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let handle = self.model_handle().await?;
        let texts = batch.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut model = handle.lock().unwrap();
            model
                .embed(texts, None)
                .map_err(|err| EmbedError::Provider {
                    provider: PROVIDER_NAME,
                    message: err.to_string(),
                })
        })
        .await
        .map_err(|err| EmbedError::Provider {
            provider: PROVIDER_NAME,
            message: err.to_string(),
        })?
    }
}
