//! The math solve pipeline.
//!
//! ```text
//! parse ─┬─ needs_clarification ─▶ clarify ─▶ END
//!        └─ solvable ─▶ solve ─▶ verify ─┬─ needs_human ─▶ review ─▶ END
//!                                        └─ verified ────▶ explain ─▶ END
//! ```

use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::Utc;
use tracing::{info, instrument};

use mathwise_core::errors::MathwiseResult;
use mathwise_core::models::InputType;
use mathwise_core::traits::{IExplainer, IParser, IRetriever, ISolver, IVerifier};
use mathwise_core::MathwiseConfig;
use mathwise_observability::{events, MetricsCollector};

use crate::graph::{CompiledGraph, GraphState, StateGraph, END};
use crate::guard::CallGuard;
use crate::nodes::{self, NodeContext, ParseRoute, VerifyRoute};
use crate::state::{PipelineState, StateUpdate};

/// The language-model collaborators driven by the pipeline.
#[derive(Clone)]
pub struct Collaborators {
    pub parser: Arc<dyn IParser>,
    pub solver: Arc<dyn ISolver>,
    pub verifier: Arc<dyn IVerifier>,
    pub explainer: Arc<dyn IExplainer>,
}

pub struct MathPipeline {
    graph: CompiledGraph<PipelineState>,
    metrics: Arc<Mutex<MetricsCollector>>,
}

impl MathPipeline {
    /// Build and compile the six-node graph. Fails only on a graph
    /// configuration error or when the call guard cannot start.
    pub fn new(
        retriever: Arc<dyn IRetriever>,
        collaborators: Collaborators,
        config: &MathwiseConfig,
    ) -> MathwiseResult<Self> {
        let metrics = Arc::new(Mutex::new(MetricsCollector::new()));
        let ctx = Arc::new(NodeContext {
            retriever,
            collaborators,
            guard: CallGuard::new(config.pipeline.collaborator_timeout())?,
            retrieval: config.retrieval.clone(),
            pipeline: config.pipeline.clone(),
            metrics: Arc::clone(&metrics),
        });

        let mut graph = StateGraph::new();
        graph
            .add_node("parse", node(&ctx, nodes::parse))
            .add_node("solve", node(&ctx, nodes::solve))
            .add_node("verify", node(&ctx, nodes::verify))
            .add_node("explain", node(&ctx, nodes::explain))
            .add_node("clarify", node(&ctx, nodes::clarify))
            .add_node("review", node(&ctx, nodes::review))
            .set_entry_point("parse")
            .add_conditional_edges(
                "parse",
                nodes::route_after_parse,
                [(ParseRoute::Clarify, "clarify"), (ParseRoute::Solve, "solve")],
            )
            .add_edge("solve", "verify")
            .add_conditional_edges(
                "verify",
                nodes::route_after_verify,
                [(VerifyRoute::Review, "review"), (VerifyRoute::Explain, "explain")],
            )
            .add_edge("explain", END)
            .add_edge("clarify", END)
            .add_edge("review", END)
            .with_max_steps(config.pipeline.max_steps);

        Ok(Self {
            graph: graph.compile()?,
            metrics,
        })
    }

    /// Run one request to a terminal state.
    ///
    /// Never fails: every collaborator or node failure is recorded on the
    /// returned state, whose `status` is always terminal.
    #[instrument(skip(self, raw_input), fields(input_len = raw_input.len()))]
    pub fn process(&self, raw_input: &str, input_type: InputType) -> PipelineState {
        let started = Instant::now();
        let execution = self.graph.run(PipelineState::new(raw_input, input_type));
        let mut state = execution.state;

        if !state.is_terminal() {
            state.mark_error(
                "pipeline",
                "incomplete",
                "graph finished without reaching a terminal status",
            );
        }
        if state.finished_at.is_none() {
            state.finished_at = Some(Utc::now());
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        {
            let mut metrics = match self.metrics.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            metrics.pipeline.record_request(state.status.as_str(), duration_ms);
            for entry in &state.errors {
                if entry.recovered {
                    metrics.pipeline.record_degradation(&entry.agent);
                } else {
                    metrics.pipeline.record_node_failure(&entry.agent);
                }
            }
        }
        events::request_finished(state.status.as_str(), execution.steps, duration_ms);
        info!(status = state.status.as_str(), reason = %state.reason(), "request processed");
        state
    }

    /// Snapshot of pipeline and retrieval metrics.
    pub fn metrics(&self) -> MetricsCollector {
        match self.metrics.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn graph(&self) -> &CompiledGraph<PipelineState> {
        &self.graph
    }
}

/// Bind a node function to the shared context.
fn node<F>(
    ctx: &Arc<NodeContext>,
    f: F,
) -> impl Fn(&PipelineState) -> MathwiseResult<StateUpdate> + Send + Sync + 'static
where
    F: Fn(&NodeContext, &PipelineState) -> MathwiseResult<StateUpdate> + Send + Sync + 'static,
{
    let ctx = Arc::clone(ctx);
    move |state| f(&ctx, state)
}
