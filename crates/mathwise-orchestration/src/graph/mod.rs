//! A small state-graph engine.
//!
//! Nodes are functions `&S -> S::Update`; the engine merges each update into
//! the running state and then follows the node's outgoing edge. Conditional
//! edges route on a closed label enum ([`RouteLabel`]) whose every variant
//! must map to a declared node or [`END`]; unresolved references are reported
//! by [`StateGraph::compile`], never at run time.
//!
//! ```text
//! let mut g = StateGraph::new();
//! g.add_node("parse", parse);
//! g.add_conditional_edges("parse", route, [(Route::Solve, "solve"), (Route::Stop, END)]);
//! g.set_entry_point("parse");
//! let compiled = g.compile()?;
//! ```

mod builder;
mod compiled;

use std::sync::Arc;

use mathwise_core::errors::MathwiseResult;

pub use builder::StateGraph;
pub use compiled::{CompiledGraph, Execution};

/// Terminal marker usable as an edge target.
pub const END: &str = "__end__";

/// State threaded through a graph.
pub trait GraphState {
    /// Partial output of a node.
    type Update;

    fn merge(&mut self, update: Self::Update);

    /// Once true, no further node runs.
    fn is_terminal(&self) -> bool;

    /// Record a node error or panic and move the state to a terminal
    /// failure status.
    fn record_failure(&mut self, node: &str, reason: &str);

    /// Record a router failure. `node` has already run and its update is
    /// merged, so implementations must not account for it a second time.
    fn record_routing_failure(&mut self, node: &str, reason: &str) {
        self.record_failure(node, reason);
    }
}

/// Closed set of labels a conditional edge can produce.
pub trait RouteLabel: Copy + Eq + Send + Sync + 'static {
    /// Every variant. The route map must cover all of them.
    const ALL: &'static [Self];

    fn name(self) -> &'static str;
}

pub(crate) type NodeFn<S> =
    Arc<dyn Fn(&S) -> MathwiseResult<<S as GraphState>::Update> + Send + Sync>;

/// Type-erased router: index of the chosen label in `L::ALL`.
pub(crate) type RouterFn<S> = Arc<dyn Fn(&S) -> Option<usize> + Send + Sync>;

#[cfg(test)]
mod tests;
