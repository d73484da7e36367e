//! EmbeddingEngine: fallback chain plus L1 cache behind `IEmbeddingProvider`.

use mathwise_core::config::EmbeddingConfig;
use mathwise_core::errors::MathwiseResult;
use mathwise_core::models::DegradationEvent;
use mathwise_core::traits::IEmbeddingProvider;
use tracing::{debug, info};

use crate::cache::L1MemoryCache;
use crate::degradation::DegradationChain;
use crate::providers::{self, HashingEmbedder};

/// The embedder handed to the retrieval layer.
///
/// The configured provider is tried first and the hashing embedder always
/// backs it up, so `embed` only fails when every provider does.
pub struct EmbeddingEngine {
    chain: DegradationChain,
    cache: L1MemoryCache,
    config: EmbeddingConfig,
}

impl EmbeddingEngine {
    pub fn new(config: EmbeddingConfig) -> Self {
        let primary = providers::create_provider(&config);
        Self::with_primary(config, primary)
    }

    /// Build an engine around an externally supplied primary provider.
    pub fn with_primary(config: EmbeddingConfig, primary: Box<dyn IEmbeddingProvider>) -> Self {
        let mut chain = DegradationChain::new(config.dimensions);
        chain.push(primary);
        chain.push(Box::new(HashingEmbedder::new(config.dimensions)));

        info!(
            provider = chain.active_provider_name(),
            dims = config.dimensions,
            "EmbeddingEngine initialized"
        );

        Self {
            chain,
            cache: L1MemoryCache::new(config.l1_cache_size),
            config,
        }
    }

    /// Drain fallback events accumulated since the last call.
    pub fn drain_degradation_events(&self) -> Vec<DegradationEvent> {
        self.chain.drain_events()
    }

    pub fn active_provider(&self) -> &str {
        self.chain.active_provider_name()
    }

    pub fn cache(&self) -> &L1MemoryCache {
        &self.cache
    }
}

impl IEmbeddingProvider for EmbeddingEngine {
    fn embed(&self, text: &str) -> MathwiseResult<Vec<f32>> {
        let key = L1MemoryCache::key_for(text);
        if let Some(vec) = self.cache.get(&key) {
            debug!(hash = %key, "embedding cache hit");
            return Ok(vec);
        }

        let (embedding, provider) = self.chain.embed(text)?;
        debug!(hash = %key, provider, "embedded text");
        self.cache.insert(key, embedding.clone());
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        "mathwise-embedding-engine"
    }

    fn is_available(&self) -> bool {
        true
    }
}
