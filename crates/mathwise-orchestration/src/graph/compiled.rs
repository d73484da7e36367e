use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use petgraph::dot::Dot;
use petgraph::graph::DiGraph;
use tracing::debug;

use mathwise_observability::events;

use super::{GraphState, NodeFn, RouterFn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    Node(String),
    End,
}

pub(crate) enum CompiledEdge<S: GraphState> {
    Direct(Target),
    Conditional {
        router: RouterFn<S>,
        labels: Vec<&'static str>,
        targets: Vec<Target>,
    },
}

/// Outcome of one invocation.
#[derive(Debug, Clone)]
pub struct Execution<S> {
    pub state: S,
    /// Number of node executions.
    pub steps: usize,
    /// Nodes in execution order.
    pub path: Vec<String>,
}

/// A validated, executable state graph.
pub struct CompiledGraph<S: GraphState> {
    pub(crate) nodes: HashMap<String, NodeFn<S>>,
    pub(crate) order: Vec<String>,
    pub(crate) edges: HashMap<String, CompiledEdge<S>>,
    pub(crate) entry: String,
    pub(crate) max_steps: usize,
    pub(crate) topology: DiGraph<String, &'static str>,
    pub(crate) unreachable: Vec<String>,
}

impl<S: GraphState> CompiledGraph<S> {
    pub fn invoke(&self, state: S) -> S {
        self.run(state).state
    }

    /// Execute from the entry point until the state is terminal, a node
    /// without an outgoing edge finishes, or `END` is reached.
    ///
    /// Node errors, node panics and an exhausted step budget are recorded
    /// through [`GraphState::record_failure`], router failures through
    /// [`GraphState::record_routing_failure`]. Nothing propagates to the
    /// caller.
    pub fn run(&self, mut state: S) -> Execution<S> {
        let mut path = Vec::new();
        let mut current = Target::Node(self.entry.clone());

        while let Target::Node(name) = current {
            if path.len() >= self.max_steps {
                let reason = format!("step limit of {} exceeded", self.max_steps);
                events::node_failed(&name, &reason);
                state.record_failure(&name, &reason);
                break;
            }
            let Some(node) = self.nodes.get(&name) else {
                let reason = "node is not registered".to_string();
                events::node_failed(&name, &reason);
                state.record_failure(&name, &reason);
                break;
            };

            path.push(name.clone());
            match catch_unwind(AssertUnwindSafe(|| node(&state))) {
                Ok(Ok(update)) => {
                    state.merge(update);
                    events::node_completed(&name, path.len());
                }
                Ok(Err(e)) => {
                    let reason = e.to_string();
                    events::node_failed(&name, &reason);
                    state.record_failure(&name, &reason);
                    break;
                }
                Err(payload) => {
                    let reason = format!("node panicked: {}", panic_message(payload.as_ref()));
                    events::node_failed(&name, &reason);
                    state.record_failure(&name, &reason);
                    break;
                }
            }

            if state.is_terminal() {
                break;
            }
            current = match self.next(&name, &state) {
                Ok(target) => target,
                Err(reason) => {
                    events::node_failed(&name, &reason);
                    state.record_routing_failure(&name, &reason);
                    break;
                }
            };
        }

        debug!(steps = path.len(), path = ?path, "graph invocation finished");
        Execution {
            steps: path.len(),
            state,
            path,
        }
    }

    fn next(&self, from: &str, state: &S) -> Result<Target, String> {
        match self.edges.get(from) {
            None => Ok(Target::End),
            Some(CompiledEdge::Direct(target)) => Ok(target.clone()),
            Some(CompiledEdge::Conditional {
                router,
                labels,
                targets,
            }) => {
                let chosen = catch_unwind(AssertUnwindSafe(|| router(state))).map_err(|p| {
                    format!("router panicked: {}", panic_message(p.as_ref()))
                })?;
                let index =
                    chosen.ok_or_else(|| "router produced an undeclared label".to_string())?;
                let (Some(label), Some(target)) = (labels.get(index), targets.get(index)) else {
                    return Err(format!("no route for label index {index}"));
                };
                debug!(from = %from, label = %label, "conditional edge taken");
                Ok(target.clone())
            }
        }
    }

    pub fn entry_point(&self) -> &str {
        &self.entry
    }

    /// Declared nodes in declaration order.
    pub fn node_names(&self) -> &[String] {
        &self.order
    }

    /// Nodes no path from the entry point reaches.
    pub fn unreachable_nodes(&self) -> &[String] {
        &self.unreachable
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Graphviz rendering of the topology. Conditional edges carry their
    /// label.
    pub fn to_dot(&self) -> String {
        Dot::new(&self.topology).to_string()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
