use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbedError {
    /// A requested provider is missing credentials or a model identifier.
    #[error("embedding provider not configured: {0}")]
    Configuration(String),
    /// A provider call failed: network error, timeout, non-success status,
    /// or a malformed response body.
    #[error("{provider} embeddings failed: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },
    /// The chain produced a different number of vectors than inputs.
    #[error("embedding count mismatch: {actual} vectors for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },
    /// Vector dimensionalities disagree.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
