//! Requests per terminal status, node failures, recovered degradations,
//! latency.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineMetrics {
    /// Finished requests keyed by terminal status.
    pub requests_by_status: HashMap<String, u64>,
    /// Unrecovered failures keyed by agent.
    pub node_failures: HashMap<String, u64>,
    /// Failures a fallback absorbed, keyed by agent.
    #[serde(default)]
    pub degradations: HashMap<String, u64>,
    pub total_duration_ms: u64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&mut self, status: &str, duration_ms: u64) {
        *self.requests_by_status.entry(status.to_string()).or_default() += 1;
        self.total_duration_ms += duration_ms;
    }

    pub fn record_node_failure(&mut self, node: &str) {
        *self.node_failures.entry(node.to_string()).or_default() += 1;
    }

    pub fn record_degradation(&mut self, agent: &str) {
        *self.degradations.entry(agent.to_string()).or_default() += 1;
    }

    pub fn total_requests(&self) -> u64 {
        self.requests_by_status.values().sum()
    }

    pub fn requests_with_status(&self, status: &str) -> u64 {
        self.requests_by_status.get(status).copied().unwrap_or(0)
    }

    pub fn mean_latency_ms(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        self.total_duration_ms as f64 / total as f64
    }
}
