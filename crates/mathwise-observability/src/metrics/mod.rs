//! In-process metrics.
//!
//! [`MetricsCollector`] owns the domain collectors and is what callers
//! snapshot.

pub mod pipeline_metrics;
pub mod retrieval_metrics;

pub use pipeline_metrics::PipelineMetrics;
pub use retrieval_metrics::RetrievalMetrics;

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct MetricsCollector {
    pub pipeline: PipelineMetrics,
    pub retrieval: RetrievalMetrics,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
