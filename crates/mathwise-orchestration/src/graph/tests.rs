use mathwise_core::errors::{CollaboratorError, GraphError, MathwiseResult};

use super::*;

#[derive(Debug, Default)]
struct Tally {
    value: i64,
    visited: Vec<String>,
    done: bool,
    failure: Option<(String, String)>,
    misrouted: bool,
}

#[derive(Default)]
struct TallyUpdate {
    add: i64,
    visited: Option<String>,
    done: bool,
}

impl GraphState for Tally {
    type Update = TallyUpdate;

    fn merge(&mut self, update: TallyUpdate) {
        self.value += update.add;
        self.visited.extend(update.visited);
        self.done |= update.done;
    }

    fn is_terminal(&self) -> bool {
        self.done || self.failure.is_some()
    }

    fn record_failure(&mut self, node: &str, reason: &str) {
        self.failure = Some((node.to_string(), reason.to_string()));
    }

    fn record_routing_failure(&mut self, node: &str, reason: &str) {
        self.misrouted = true;
        self.record_failure(node, reason);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parity {
    Even,
    Odd,
}

impl RouteLabel for Parity {
    const ALL: &'static [Self] = &[Parity::Even, Parity::Odd];

    fn name(self) -> &'static str {
        match self {
            Parity::Even => "even",
            Parity::Odd => "odd",
        }
    }
}

fn step(name: &'static str, add: i64) -> impl Fn(&Tally) -> MathwiseResult<TallyUpdate> {
    move |_| {
        Ok(TallyUpdate {
            add,
            visited: Some(name.to_string()),
            done: false,
        })
    }
}

fn parity(t: &Tally) -> Parity {
    if t.value % 2 == 0 {
        Parity::Even
    } else {
        Parity::Odd
    }
}

fn branching_graph(start_add: i64) -> CompiledGraph<Tally> {
    let mut g = StateGraph::new();
    g.add_node("start", step("start", start_add))
        .add_node("even", step("even", 10))
        .add_node("odd", step("odd", 100))
        .set_entry_point("start")
        .add_conditional_edges("start", parity, [(Parity::Even, "even"), (Parity::Odd, "odd")])
        .add_edge("even", END)
        .add_edge("odd", END);
    g.compile().unwrap()
}

#[test]
fn routes_on_post_merge_state() {
    let graph = branching_graph(1);
    let out = graph.run(Tally::default());
    assert_eq!(out.path, vec!["start", "odd"]);
    assert_eq!(out.state.value, 101);

    let out = graph.run(Tally::default());
    assert_eq!(out.steps, 2);

    let graph = branching_graph(2);
    let state = graph.invoke(Tally::default());
    assert_eq!(state.visited, vec!["start", "even"]);
    assert_eq!(state.value, 12);
}

#[test]
fn node_without_outgoing_edge_is_terminal() {
    let mut g = StateGraph::new();
    g.add_node("a", step("a", 1))
        .add_node("b", step("b", 1))
        .add_edge("a", "b")
        .set_entry_point("a");
    let out = g.compile().unwrap().run(Tally::default());
    assert_eq!(out.path, vec!["a", "b"]);
    assert!(out.state.failure.is_none());
}

#[test]
fn terminal_state_stops_execution() {
    let mut g = StateGraph::new();
    g.add_node("finish", |_: &Tally| {
        Ok(TallyUpdate {
            done: true,
            ..Default::default()
        })
    })
    .add_node("after", step("after", 1))
    .add_edge("finish", "after")
    .set_entry_point("finish");
    let out = g.compile().unwrap().run(Tally::default());
    assert_eq!(out.path, vec!["finish"]);
    assert_eq!(out.state.value, 0);
}

#[test]
fn router_panic_is_recorded_as_a_routing_failure() {
    let mut g = StateGraph::new();
    g.add_node("start", step("start", 1))
        .add_node("even", step("even", 10))
        .add_node("odd", step("odd", 100))
        .set_entry_point("start")
        .add_conditional_edges(
            "start",
            |_: &Tally| -> Parity { panic!("no parity") },
            [(Parity::Even, "even"), (Parity::Odd, "odd")],
        )
        .add_edge("even", END)
        .add_edge("odd", END);
    let out = g.compile().unwrap().run(Tally::default());

    assert_eq!(out.path, vec!["start"]);
    assert_eq!(out.state.visited, vec!["start"]);
    assert!(out.state.misrouted);
    let (node, reason) = out.state.failure.unwrap();
    assert_eq!(node, "start");
    assert!(reason.contains("router panicked: no parity"));
}

#[test]
fn node_error_is_recorded_not_raised() {
    let mut g = StateGraph::new();
    g.add_node("boom", |_: &Tally| -> MathwiseResult<TallyUpdate> {
        Err(CollaboratorError::Failed {
            agent: "solver".into(),
            reason: "offline".into(),
        }
        .into())
    })
    .add_node("after", step("after", 1))
    .add_edge("boom", "after")
    .set_entry_point("boom");
    let out = g.compile().unwrap().run(Tally::default());
    let (node, reason) = out.state.failure.unwrap();
    assert_eq!(node, "boom");
    assert!(reason.contains("offline"));
    assert_eq!(out.path, vec!["boom"]);
}

#[test]
fn node_panic_is_caught() {
    let mut g = StateGraph::new();
    g.add_node("panics", |_: &Tally| -> MathwiseResult<TallyUpdate> {
        panic!("kaboom")
    })
    .set_entry_point("panics");
    let out = g.compile().unwrap().run(Tally::default());
    let (node, reason) = out.state.failure.unwrap();
    assert_eq!(node, "panics");
    assert!(reason.contains("kaboom"));
}

#[test]
fn routing_loop_hits_step_limit() {
    let mut g = StateGraph::new();
    g.add_node("spin", step("spin", 1))
        .add_edge("spin", "spin")
        .set_entry_point("spin")
        .with_max_steps(5);
    let out = g.compile().unwrap().run(Tally::default());
    assert_eq!(out.steps, 5);
    let (node, reason) = out.state.failure.unwrap();
    assert_eq!(node, "spin");
    assert!(reason.contains("step limit"));
}

#[test]
fn compile_requires_entry_point() {
    let mut g: StateGraph<Tally> = StateGraph::new();
    g.add_node("a", step("a", 1));
    assert_eq!(g.compile().err(), Some(GraphError::NoEntryPoint));

    let mut g: StateGraph<Tally> = StateGraph::new();
    g.add_node("a", step("a", 1)).set_entry_point("missing");
    assert!(matches!(
        g.compile().err(),
        Some(GraphError::UnknownNode { node, .. }) if node == "missing"
    ));
}

#[test]
fn compile_rejects_duplicate_and_reserved_nodes() {
    let mut g: StateGraph<Tally> = StateGraph::new();
    g.add_node("a", step("a", 1))
        .add_node("a", step("a", 2))
        .set_entry_point("a");
    assert_eq!(g.compile().err(), Some(GraphError::DuplicateNode("a".into())));

    let mut g: StateGraph<Tally> = StateGraph::new();
    g.add_node(END, step("end", 1)).set_entry_point(END);
    assert_eq!(g.compile().err(), Some(GraphError::ReservedName(END.into())));
}

#[test]
fn compile_rejects_unknown_edge_target() {
    let mut g: StateGraph<Tally> = StateGraph::new();
    g.add_node("a", step("a", 1))
        .add_edge("a", "nowhere")
        .set_entry_point("a");
    assert_eq!(
        g.compile().err(),
        Some(GraphError::UnknownNode {
            node: "nowhere".into(),
            referenced_by: "a".into()
        })
    );

    let mut g: StateGraph<Tally> = StateGraph::new();
    g.add_node("a", step("a", 1))
        .add_edge("ghost", "a")
        .set_entry_point("a");
    assert!(matches!(
        g.compile().err(),
        Some(GraphError::UnknownNode { node, .. }) if node == "ghost"
    ));
}

#[test]
fn compile_rejects_conflicting_edges() {
    let mut g: StateGraph<Tally> = StateGraph::new();
    g.add_node("a", step("a", 1))
        .add_node("b", step("b", 1))
        .add_edge("a", "b")
        .add_conditional_edges("a", parity, [(Parity::Even, "b"), (Parity::Odd, END)])
        .set_entry_point("a");
    assert_eq!(g.compile().err(), Some(GraphError::ConflictingEdges("a".into())));
}

#[test]
fn compile_rejects_unrouted_label() {
    let mut g: StateGraph<Tally> = StateGraph::new();
    g.add_node("a", step("a", 1))
        .add_node("b", step("b", 1))
        .add_conditional_edges("a", parity, [(Parity::Even, "b")])
        .set_entry_point("a");
    assert_eq!(
        g.compile().err(),
        Some(GraphError::UnroutedLabel {
            from: "a".into(),
            label: "odd".into()
        })
    );

    let mut g: StateGraph<Tally> = StateGraph::new();
    g.add_node("a", step("a", 1))
        .add_conditional_edges("a", parity, [(Parity::Even, END), (Parity::Odd, "c")])
        .set_entry_point("a");
    assert!(matches!(
        g.compile().err(),
        Some(GraphError::UnknownNode { node, .. }) if node == "c"
    ));
}

#[test]
fn reports_unreachable_nodes_and_renders_dot() {
    let mut g = StateGraph::new();
    g.add_node("start", step("start", 1))
        .add_node("even", step("even", 1))
        .add_node("odd", step("odd", 1))
        .add_node("orphan", step("orphan", 1))
        .add_conditional_edges("start", parity, [(Parity::Even, "even"), (Parity::Odd, "odd")])
        .add_edge("orphan", "start")
        .set_entry_point("start");
    let graph = g.compile().unwrap();
    assert_eq!(graph.unreachable_nodes(), ["orphan".to_string()]);
    assert_eq!(graph.entry_point(), "start");
    assert_eq!(graph.node_names().len(), 4);

    let dot = graph.to_dot();
    assert!(dot.contains("digraph"));
    assert!(dot.contains("even"));
    assert!(dot.contains("odd"));
}
