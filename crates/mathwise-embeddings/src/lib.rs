//! # mathwise-embeddings
//!
//! Embedding generation for the knowledge corpus and queries.
//! Provider fallback chain, blake3-keyed L1 cache, and a deterministic
//! hashing provider that needs no model files.

pub mod cache;
pub mod degradation;
pub mod engine;
pub mod providers;

pub use engine::EmbeddingEngine;
pub use providers::{create_provider, HashingEmbedder};
