//! Structured log events for key pipeline and retrieval milestones.
//!
//! Each function emits a `tracing` event with structured fields.

/// A batch of documents became searchable.
pub fn documents_indexed(added: usize, total: usize, generation: u64) {
    tracing::info!(
        event = "documents_indexed",
        added = added,
        total = total,
        generation = generation,
        "documents indexed"
    );
}

/// A search finished.
pub fn retrieval_completed(method: &str, results: usize, top_score: f64) {
    tracing::debug!(
        event = "retrieval_completed",
        method = %method,
        results = results,
        top_score = top_score,
        "retrieval completed"
    );
}

pub fn node_completed(node: &str, step: usize) {
    tracing::debug!(
        event = "node_completed",
        node = %node,
        step = step,
        "node completed"
    );
}

/// A node failed and the request is short-circuiting to `error`.
pub fn node_failed(node: &str, reason: &str) {
    tracing::error!(
        event = "node_failed",
        node = %node,
        reason = %reason,
        "node failed"
    );
}

/// A collaborator failed and a fallback value was used instead.
pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

/// A request reached its terminal state.
pub fn request_finished(status: &str, steps: usize, duration_ms: u64) {
    tracing::info!(
        event = "request_finished",
        status = %status,
        steps = steps,
        duration_ms = duration_ms,
        "request finished"
    );
}
