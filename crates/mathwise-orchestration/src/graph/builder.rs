use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use tracing::{debug, warn};

use mathwise_core::errors::{GraphError, MathwiseResult};

use super::compiled::{CompiledEdge, CompiledGraph, Target};
use super::{GraphState, NodeFn, RouteLabel, RouterFn, END};

/// Default bound on node executions per invocation.
const DEFAULT_MAX_STEPS: usize = 25;

enum EdgeSpec<S: GraphState> {
    Direct(String),
    Conditional {
        router: RouterFn<S>,
        labels: Vec<&'static str>,
        targets: Vec<Option<String>>,
    },
}

/// Graph under construction.
///
/// Builder calls never fail; problems are collected and reported by
/// [`compile`](Self::compile).
pub struct StateGraph<S: GraphState> {
    nodes: Vec<(String, NodeFn<S>)>,
    edges: Vec<(String, EdgeSpec<S>)>,
    entry: Option<String>,
    max_steps: usize,
    problems: Vec<GraphError>,
}

impl<S: GraphState> Default for StateGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GraphState> StateGraph<S> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            entry: None,
            max_steps: DEFAULT_MAX_STEPS,
            problems: Vec::new(),
        }
    }

    pub fn add_node<F>(&mut self, name: &str, node: F) -> &mut Self
    where
        F: Fn(&S) -> MathwiseResult<S::Update> + Send + Sync + 'static,
    {
        if name == END {
            self.problems.push(GraphError::ReservedName(name.to_string()));
        } else if self.nodes.iter().any(|(n, _)| n == name) {
            self.problems.push(GraphError::DuplicateNode(name.to_string()));
        } else {
            self.nodes.push((name.to_string(), Arc::new(node)));
        }
        self
    }

    /// Unconditional edge. `to` may be [`END`].
    pub fn add_edge(&mut self, from: &str, to: &str) -> &mut Self {
        self.push_edge(from, EdgeSpec::Direct(to.to_string()))
    }

    /// Route out of `from` by the label `router` returns on the post-merge
    /// state. `routes` must map every variant of `L`.
    pub fn add_conditional_edges<L, R, I, T>(
        &mut self,
        from: &str,
        router: R,
        routes: I,
    ) -> &mut Self
    where
        L: RouteLabel,
        R: Fn(&S) -> L + Send + Sync + 'static,
        I: IntoIterator<Item = (L, T)>,
        T: Into<String>,
    {
        let labels: Vec<&'static str> = L::ALL.iter().map(|l| l.name()).collect();
        let mut targets = vec![None; L::ALL.len()];
        for (label, target) in routes {
            if let Some(i) = L::ALL.iter().position(|l| *l == label) {
                targets[i] = Some(target.into());
            }
        }
        let router: RouterFn<S> = Arc::new(move |state: &S| {
            let label = router(state);
            L::ALL.iter().position(|l| *l == label)
        });
        self.push_edge(
            from,
            EdgeSpec::Conditional {
                router,
                labels,
                targets,
            },
        )
    }

    pub fn set_entry_point(&mut self, name: &str) -> &mut Self {
        self.entry = Some(name.to_string());
        self
    }

    pub fn with_max_steps(&mut self, max_steps: usize) -> &mut Self {
        self.max_steps = max_steps.max(1);
        self
    }

    fn push_edge(&mut self, from: &str, spec: EdgeSpec<S>) -> &mut Self {
        if self.edges.iter().any(|(f, _)| f == from) {
            self.problems.push(GraphError::ConflictingEdges(from.to_string()));
        } else {
            self.edges.push((from.to_string(), spec));
        }
        self
    }

    /// Validate the graph and freeze it for execution.
    pub fn compile(self) -> Result<CompiledGraph<S>, GraphError> {
        if let Some(problem) = self.problems.into_iter().next() {
            return Err(problem);
        }

        let declared: HashSet<&str> = self.nodes.iter().map(|(n, _)| n.as_str()).collect();
        let resolve = |target: &str, referenced_by: &str| -> Result<Target, GraphError> {
            if target == END {
                Ok(Target::End)
            } else if declared.contains(target) {
                Ok(Target::Node(target.to_string()))
            } else {
                Err(GraphError::UnknownNode {
                    node: target.to_string(),
                    referenced_by: referenced_by.to_string(),
                })
            }
        };

        let entry = self.entry.ok_or(GraphError::NoEntryPoint)?;
        if !declared.contains(entry.as_str()) {
            return Err(GraphError::UnknownNode {
                node: entry,
                referenced_by: "entry point".to_string(),
            });
        }

        let mut edges = HashMap::with_capacity(self.edges.len());
        for (from, spec) in self.edges {
            if !declared.contains(from.as_str()) {
                return Err(GraphError::UnknownNode {
                    node: from,
                    referenced_by: "edge source".to_string(),
                });
            }
            let compiled = match spec {
                EdgeSpec::Direct(to) => CompiledEdge::Direct(resolve(&to, &from)?),
                EdgeSpec::Conditional {
                    router,
                    labels,
                    targets,
                } => {
                    let mut resolved = Vec::with_capacity(targets.len());
                    for (label, target) in labels.iter().zip(targets) {
                        let target = target.ok_or_else(|| GraphError::UnroutedLabel {
                            from: from.clone(),
                            label: label.to_string(),
                        })?;
                        resolved.push(resolve(&target, &from)?);
                    }
                    CompiledEdge::Conditional {
                        router,
                        labels,
                        targets: resolved,
                    }
                }
            };
            edges.insert(from, compiled);
        }

        let order: Vec<String> = self.nodes.iter().map(|(n, _)| n.clone()).collect();
        let (topology, unreachable) = build_topology(&order, &edges, &entry);
        for node in &unreachable {
            warn!(node = %node, entry = %entry, "node is unreachable from the entry point");
        }
        debug!(
            nodes = order.len(),
            edges = topology.edge_count(),
            entry = %entry,
            "state graph compiled"
        );

        Ok(CompiledGraph {
            nodes: self.nodes.into_iter().collect(),
            order,
            edges,
            entry,
            max_steps: self.max_steps,
            topology,
            unreachable,
        })
    }
}

/// Mirror the compiled edges into a petgraph for reachability and DOT
/// output.
fn build_topology<S: GraphState>(
    order: &[String],
    edges: &HashMap<String, CompiledEdge<S>>,
    entry: &str,
) -> (DiGraph<String, &'static str>, Vec<String>) {
    let mut graph = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();
    for name in order {
        index.insert(name.as_str(), graph.add_node(name.clone()));
    }
    let end = graph.add_node(END.to_string());
    let lookup = |target: &Target| match target {
        Target::End => Some(end),
        Target::Node(name) => index.get(name.as_str()).copied(),
    };

    for name in order {
        let Some(&from) = index.get(name.as_str()) else {
            continue;
        };
        match edges.get(name) {
            Some(CompiledEdge::Direct(target)) => {
                if let Some(to) = lookup(target) {
                    graph.add_edge(from, to, "");
                }
            }
            Some(CompiledEdge::Conditional {
                labels, targets, ..
            }) => {
                for (label, target) in labels.iter().zip(targets) {
                    if let Some(to) = lookup(target) {
                        graph.add_edge(from, to, *label);
                    }
                }
            }
            None => {}
        }
    }

    let mut reachable = HashSet::new();
    if let Some(&start) = index.get(entry) {
        let mut dfs = Dfs::new(&graph, start);
        while let Some(nx) = dfs.next(&graph) {
            reachable.insert(nx);
        }
    }
    let unreachable = order
        .iter()
        .filter(|name| {
            index
                .get(name.as_str())
                .is_some_and(|ix| !reachable.contains(ix))
        })
        .cloned()
        .collect();

    (graph, unreachable)
}
