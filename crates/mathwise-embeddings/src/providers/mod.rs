//! Embedding providers.

mod hashing;

pub use hashing::HashingEmbedder;

use mathwise_core::config::EmbeddingConfig;
use mathwise_core::traits::IEmbeddingProvider;
use tracing::warn;

/// Build the provider named in the config.
///
/// Only the hashing provider ships in-tree; unknown names fall back to it.
pub fn create_provider(config: &EmbeddingConfig) -> Box<dyn IEmbeddingProvider> {
    match config.provider.as_str() {
        "hashing" | "tfidf" => Box::new(HashingEmbedder::new(config.dimensions)),
        other => {
            warn!(
                provider = other,
                fallback = "hashing",
                "unknown embedding provider, using hashing embedder"
            );
            Box::new(HashingEmbedder::new(config.dimensions))
        }
    }
}
