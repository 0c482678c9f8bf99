//! EventEase backend: retrieval-augmented chat over uploaded documents.
//!
//! Documents are chunked, embedded through a remote-first provider chain
//! with a local fallback, and kept in a brute-force vector store persisted
//! as a JSON snapshot. Queries retrieve the top-k chunks by cosine
//! similarity and forward them, with the conversation history, to an
//! OpenAI-compatible chat completion API.

pub mod chat;
pub mod core;
pub mod embeddings;
pub mod history;
pub mod llm;
pub mod logging;
pub mod rag;
pub mod server;
pub mod state;
