//! Provider fallback chain.
//!
//! Providers are tried in order; every fallback is recorded as a
//! [`DegradationEvent`].

use std::sync::Mutex;

use chrono::Utc;
use mathwise_core::errors::{EmbeddingError, MathwiseResult};
use mathwise_core::models::DegradationEvent;
use mathwise_core::traits::IEmbeddingProvider;
use tracing::warn;

pub struct DegradationChain {
    chain: Vec<Box<dyn IEmbeddingProvider>>,
    dimensions: usize,
    events: Mutex<Vec<DegradationEvent>>,
}

impl DegradationChain {
    /// Empty chain whose providers must all produce `dimensions`-long vectors.
    pub fn new(dimensions: usize) -> Self {
        Self {
            chain: Vec::new(),
            dimensions,
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&mut self, provider: Box<dyn IEmbeddingProvider>) {
        self.chain.push(provider);
    }

    /// Embed with the first provider that is available, succeeds, and
    /// returns the expected dimensionality.
    pub fn embed(&self, text: &str) -> MathwiseResult<(Vec<f32>, &str)> {
        let mut last_error = None;

        for (i, provider) in self.chain.iter().enumerate() {
            if !provider.is_available() {
                continue;
            }
            let result = provider.embed(text).and_then(|v| {
                if v.len() == self.dimensions {
                    Ok(v)
                } else {
                    Err(EmbeddingError::DimensionMismatch {
                        expected: self.dimensions,
                        actual: v.len(),
                    }
                    .into())
                }
            });
            match result {
                Ok(vec) => {
                    if i > 0 {
                        self.record(provider.name());
                    }
                    return Ok((vec, provider.name()));
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "embed failed, trying next in chain"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            EmbeddingError::ProviderUnavailable {
                provider: "all providers exhausted".to_string(),
            }
            .into()
        }))
    }

    fn record(&self, fallback_used: &str) {
        let primary = self.chain.first().map(|p| p.name()).unwrap_or("none");
        let event = DegradationEvent {
            component: "embeddings".to_string(),
            failure: format!("{primary} failed"),
            fallback_used: fallback_used.to_string(),
            timestamp: Utc::now(),
        };
        let mut events = self.events.lock().unwrap_or_else(|p| p.into_inner());
        events.push(event);
    }

    /// Name of the first available provider.
    pub fn active_provider_name(&self) -> &str {
        self.chain
            .iter()
            .find(|p| p.is_available())
            .map(|p| p.name())
            .unwrap_or("none")
    }

    pub fn drain_events(&self) -> Vec<DegradationEvent> {
        let mut events = self.events.lock().unwrap_or_else(|p| p.into_inner());
        std::mem::take(&mut *events)
    }
}
