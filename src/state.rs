use std::sync::Arc;

use crate::chat::ChatEngine;
use crate::core::{AppConfig, AppPaths};
use crate::embeddings::EmbeddingChain;
use crate::history::ConversationHistory;
use crate::llm::GradientChatProvider;
use crate::rag::{Chunker, VectorStore};

/// Global application state shared across all routes.
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub config: AppConfig,
    pub chunker: Chunker,
    pub store: Arc<VectorStore>,
    pub engine: ChatEngine,
}

impl AppState {
    /// Loads configuration, opens the vector store (reusing a prior snapshot
    /// when present), and wires up the embedding chain and chat engine.
    pub fn initialize() -> anyhow::Result<Arc<Self>> {
        let paths = Arc::new(AppPaths::new());
        let config = AppConfig::load();
        Self::with_parts(paths, config)
    }

    pub fn with_parts(paths: Arc<AppPaths>, config: AppConfig) -> anyhow::Result<Arc<Self>> {
        let chunker = Chunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap);
        let embedder = Arc::new(EmbeddingChain::from_config(&config.embeddings)?);
        let store = Arc::new(VectorStore::open(paths.snapshot_path.clone(), embedder));

        let provider = Arc::new(GradientChatProvider::new(&config.chat)?);
        let history = ConversationHistory::new(config.history.max_messages);
        let engine = ChatEngine::new(store.clone(), provider, history, &config.chat);

        Ok(Arc::new(AppState {
            paths,
            config,
            chunker,
            store,
            engine,
        }))
    }
}
