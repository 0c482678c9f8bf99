//! Embedding provider chain.
//!
//! Texts are embedded in batches through an ordered list of strategies: the
//! remote endpoint first when enabled, then the local fastembed model. First
//! success wins; only the last strategy's failure is fatal.

mod chain;
mod error;
mod local;
mod provider;
mod remote;

pub use chain::EmbeddingChain;
pub use error::EmbedError;
pub use local::LocalEmbeddingProvider;
pub use provider::EmbeddingProvider;
pub use remote::RemoteEmbeddingProvider;
