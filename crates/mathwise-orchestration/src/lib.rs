//! # mathwise-orchestration
//!
//! A small state-graph engine (named nodes, plain and conditional edges,
//! per-field merge policies) and the math solve pipeline built on it:
//! parse → (clarify | solve → verify → (review | explain)).

pub mod graph;
pub mod guard;
pub mod nodes;
pub mod pipeline;
pub mod state;

pub use graph::{CompiledGraph, GraphState, RouteLabel, StateGraph, END};
pub use guard::CallGuard;
pub use pipeline::{Collaborators, MathPipeline};
pub use state::{PipelineState, StateUpdate, Status};
