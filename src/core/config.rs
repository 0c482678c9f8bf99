use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Application configuration, loaded from `config.yml` with environment
/// overrides for deployment secrets.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub chunking: ChunkingConfig,
    pub embeddings: EmbeddingsConfig,
    pub chat: ChatConfig,
    pub history: HistoryConfig,
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    /// Try the remote embeddings endpoint before the local model.
    pub use_remote: bool,
    pub api_base: String,
    pub api_key: Option<String>,
    /// Remote embedding model identifier. Required when `use_remote` is set.
    pub model: Option<String>,
    /// Local fallback model, resolved against the fastembed catalog.
    pub local_model: String,
    /// Texts per embeddings request.
    pub batch_size: usize,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            use_remote: true,
            api_base: "https://inference.do-ai.run".to_string(),
            api_key: None,
            model: None,
            local_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            batch_size: 32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: "https://inference.do-ai.run".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Messages kept per conversation before oldest-first eviction.
    pub max_messages: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_messages: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks retrieved per query when the request does not specify top_k.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

impl AppConfig {
    /// Loads configuration from the discovered config file, then applies
    /// environment overrides. A missing or unreadable file yields defaults.
    pub fn load() -> Self {
        let mut config = match fs::read_to_string(config_path()) {
            Ok(contents) => match serde_yaml::from_str::<AppConfig>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!("Invalid config file, using defaults: {}", err);
                    AppConfig::default()
                }
            },
            Err(_) => AppConfig::default(),
        };
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(port) = env::var("PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(key) = env::var("GRADIENT_API_KEY") {
            self.embeddings.api_key = Some(key.clone());
            self.chat.api_key = Some(key);
        }
        if let Ok(base) = env::var("GRADIENT_API_BASE") {
            self.embeddings.api_base = base.clone();
            self.chat.api_base = base;
        }
        if let Ok(model) = env::var("GRADIENT_MODEL") {
            self.chat.model = model;
        }
        if let Ok(model) = env::var("GRADIENT_EMBEDDING_MODEL") {
            self.embeddings.model = Some(model);
        }
        if let Ok(flag) = env::var("USE_GRADIENT_EMBEDDINGS") {
            self.embeddings.use_remote = parse_bool_flag(&flag);
        }
    }
}

fn config_path() -> PathBuf {
    if let Ok(path) = env::var("EVENTEASE_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    Path::new("config.yml").to_path_buf()
}

fn parse_bool_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_expected_tuning() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.embeddings.batch_size, 32);
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.history.max_messages, 30);
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let yaml = "chunking:\n  chunk_size: 400\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.chunking.chunk_size, 400);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.chat.model, "gpt-4o-mini");
    }

    #[test]
    fn bool_flag_parsing() {
        assert!(parse_bool_flag("true"));
        assert!(parse_bool_flag("YES"));
        assert!(parse_bool_flag("1"));
        assert!(!parse_bool_flag("false"));
        assert!(!parse_bool_flag("0"));
    }
}
