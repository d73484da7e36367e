use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Solve-pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Verification confidence below this routes to human review.
    pub confidence_threshold: f64,
    /// When false, low confidence alone never routes to review.
    pub hitl_enabled: bool,
    /// Upper bound for any single collaborator call, in milliseconds.
    pub collaborator_timeout_ms: u64,
    /// Maximum node executions per request.
    pub max_steps: usize,
}

impl PipelineConfig {
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: defaults::DEFAULT_CONFIDENCE_THRESHOLD,
            hitl_enabled: defaults::DEFAULT_HITL_ENABLED,
            collaborator_timeout_ms: defaults::DEFAULT_COLLABORATOR_TIMEOUT_MS,
            max_steps: defaults::DEFAULT_MAX_STEPS,
        }
    }
}
