//! # mathwise-observability
//!
//! Structured tracing setup, named log events for retrieval and pipeline
//! milestones, and in-process metrics.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::{MetricsCollector, PipelineMetrics, RetrievalMetrics};
pub use tracing_setup::events;
