use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::core::ApiError;
use crate::embeddings::{EmbedError, EmbeddingChain};

use super::similarity::cosine_similarity;

/// One ingested chunk with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Value,
    pub embedding: Vec<f32>,
}

/// Ingestion input: a chunk that has not been embedded yet.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub id: String,
    pub text: String,
    pub metadata: Value,
}

/// One similarity search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub text: String,
    pub metadata: Value,
    pub score: f32,
}

/// Brute-force vector store with a JSON snapshot on disk.
///
/// Records are kept in insertion order. Every mutation rewrites the whole
/// snapshot while still holding the write lock, so two ingestions can never
/// interleave their persist step; searches take the read lock and never
/// observe a store mid-mutation.
pub struct VectorStore {
    snapshot_path: PathBuf,
    embedder: Arc<EmbeddingChain>,
    records: RwLock<Vec<DocumentRecord>>,
}

impl VectorStore {
    /// Opens a store, loading the snapshot when one exists. A snapshot that
    /// cannot be read or parsed is logged and treated as an empty store.
    pub fn open(snapshot_path: PathBuf, embedder: Arc<EmbeddingChain>) -> Self {
        let records = load_snapshot(&snapshot_path);
        Self {
            snapshot_path,
            embedder,
            records: RwLock::new(records),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Snapshot of the current record sequence, in insertion order.
    pub async fn records(&self) -> Vec<DocumentRecord> {
        self.records.read().await.clone()
    }

    /// Embeds and appends `docs`, clearing existing records first when
    /// `override_existing` is set. Embedding runs before the store is
    /// touched: on failure nothing is cleared, appended, or persisted.
    /// Returns the number of documents added.
    pub async fn add_documents(
        &self,
        docs: Vec<DocumentInput>,
        override_existing: bool,
    ) -> Result<usize, ApiError> {
        if docs.is_empty() {
            if override_existing {
                let mut records = self.records.write().await;
                records.clear();
                persist_records(&records, &self.snapshot_path)?;
            }
            return Ok(0);
        }

        let texts: Vec<String> = docs.iter().map(|doc| doc.text.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await?;

        let mut records = self.records.write().await;
        if override_existing {
            records.clear();
        }

        // Mixing dimensionalities would poison every later search; reject
        // the whole batch instead.
        if let (Some(new), Some(existing)) = (embeddings.first(), records.first()) {
            if new.len() != existing.embedding.len() {
                return Err(EmbedError::DimensionMismatch {
                    expected: existing.embedding.len(),
                    actual: new.len(),
                }
                .into());
            }
        }

        let added = docs.len();
        for (doc, embedding) in docs.into_iter().zip(embeddings) {
            records.push(DocumentRecord {
                id: doc.id,
                text: doc.text,
                metadata: doc.metadata,
                embedding,
            });
        }
        persist_records(&records, &self.snapshot_path)?;
        tracing::info!(added, total = records.len(), "added documents to vector store");

        Ok(added)
    }

    /// Top-k records by cosine similarity, best first.
    ///
    /// An empty store or `k == 0` short-circuits before any embedding call.
    /// Ties keep insertion order: the sort is stable and compares scores
    /// only. `k` beyond the store size returns everything.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, ApiError> {
        if k == 0 || self.records.read().await.is_empty() {
            return Ok(Vec::new());
        }

        let query_text = [query.to_string()];
        let mut query_vectors = self.embedder.embed(&query_text).await?;
        let query_embedding = query_vectors.pop().ok_or_else(|| {
            ApiError::Internal("embedding chain returned no vector for query".to_string())
        })?;

        let records = self.records.read().await;
        let mut hits = Vec::with_capacity(records.len());
        for record in records.iter() {
            let score = cosine_similarity(&query_embedding, &record.embedding)?;
            hits.push(SearchHit {
                id: record.id.clone(),
                text: record.text.clone(),
                metadata: record.metadata.clone(),
                score,
            });
        }
        drop(records);

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }
}

fn load_snapshot(path: &Path) -> Vec<DocumentRecord> {
    if !path.exists() {
        return Vec::new();
    }

    let parsed = fs::read_to_string(path)
        .map_err(|err| err.to_string())
        .and_then(|contents| {
            serde_json::from_str::<Vec<DocumentRecord>>(&contents).map_err(|err| err.to_string())
        });

    match parsed {
        Ok(records) => {
            tracing::info!(count = records.len(), "loaded vector store snapshot");
            records
        }
        Err(err) => {
            tracing::warn!("Could not load vector store snapshot, starting empty: {}", err);
            Vec::new()
        }
    }
}

/// Full-overwrite snapshot write via temp file + rename, so a crash mid-write
/// cannot leave a truncated snapshot behind.
fn persist_records(records: &[DocumentRecord], path: &Path) -> Result<(), ApiError> {
    let payload = serde_json::to_string(records).map_err(ApiError::internal)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(ApiError::internal)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, payload).map_err(ApiError::internal)?;
    fs::rename(&tmp_path, path).map_err(ApiError::internal)?;
    Ok(())
}
