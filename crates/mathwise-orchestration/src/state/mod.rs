//! Per-request pipeline state.
//!
//! A [`PipelineState`] is created fresh for every request, threaded through
//! the graph, and returned to the caller once `status` is terminal. Nodes
//! never mutate it directly; they return a [`StateUpdate`] which is merged
//! field by field according to [`MERGE_POLICIES`].

mod merge;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mathwise_core::models::{Difficulty, InputType, ParsedProblem, RetrievalResult, Topic};

pub use merge::{MergePolicy, StateField, StateUpdate, MERGE_POLICIES};

use crate::graph::GraphState;

/// Lifecycle of a request. Everything except `Processing` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Processing,
    Success,
    NeedsClarification,
    NeedsReview,
    Error,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Processing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Processing => "processing",
            Status::Success => "success",
            Status::NeedsClarification => "needs_clarification",
            Status::NeedsReview => "needs_review",
            Status::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStatus {
    Started,
    Completed,
    Skipped,
}

/// One entry of the agent trace. Every node that runs contributes a
/// `Started` entry and exactly one `Completed` or `Skipped` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub agent: String,
    pub timestamp: DateTime<Utc>,
    pub status: TraceStatus,
    pub confidence: Option<f64>,
}

impl TraceEvent {
    pub fn started(agent: &str) -> Self {
        Self::new(agent, TraceStatus::Started, None)
    }

    pub fn completed(agent: &str, confidence: Option<f64>) -> Self {
        Self::new(agent, TraceStatus::Completed, confidence)
    }

    pub fn skipped(agent: &str) -> Self {
        Self::new(agent, TraceStatus::Skipped, None)
    }

    fn new(agent: &str, status: TraceStatus, confidence: Option<f64>) -> Self {
        Self {
            agent: agent.to_string(),
            timestamp: Utc::now(),
            status,
            confidence,
        }
    }
}

/// A failure recorded on the state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub agent: String,
    /// Machine-readable kind: `timeout`, `failed`, `panicked`,
    /// `malformed_output`, `node_failure`, ...
    pub kind: String,
    pub message: String,
    /// The node replaced the failed output with a fallback and the request
    /// carried on.
    #[serde(default)]
    pub recovered: bool,
}

impl ErrorEntry {
    pub fn new(agent: &str, kind: &str, message: impl Into<String>) -> Self {
        Self {
            agent: agent.to_string(),
            kind: kind.to_string(),
            message: message.into(),
            recovered: false,
        }
    }

    pub fn recovered(agent: &str, kind: &str, message: impl Into<String>) -> Self {
        Self {
            recovered: true,
            ..Self::new(agent, kind, message)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionAttempt {
    /// 1-based attempt number within the request.
    pub attempt: usize,
    pub solution: String,
    pub tool_used: Option<String>,
    pub citations: Vec<String>,
}

/// The shared record threaded through the solve pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    // Input
    pub raw_input: String,
    pub input_type: InputType,

    // Parsing
    pub parsed_problem: Option<ParsedProblem>,
    pub needs_clarification: bool,
    pub clarification_reason: Option<String>,
    pub topic: Option<Topic>,
    pub difficulty: Option<Difficulty>,
    pub question_type: Option<String>,

    // Retrieval
    pub retrieved_context: Vec<RetrievalResult>,
    pub retrieval_method: Option<String>,
    pub retrieval_quality: Option<f64>,

    // Solving
    pub current_solution: String,
    pub solution_attempts: Vec<SolutionAttempt>,

    // Verification
    pub verification_passed: bool,
    pub verification_confidence: Option<f64>,
    pub verification_issues: Vec<String>,

    // Explanation
    pub explanation: Option<String>,

    // Human in the loop
    pub needs_human: bool,
    pub human_trigger_reason: Option<String>,

    // Bookkeeping
    pub status: Status,
    pub errors: Vec<ErrorEntry>,
    pub agent_trace: Vec<TraceEvent>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl PipelineState {
    pub fn new(raw_input: impl Into<String>, input_type: InputType) -> Self {
        Self {
            raw_input: raw_input.into(),
            input_type,
            parsed_problem: None,
            needs_clarification: false,
            clarification_reason: None,
            topic: None,
            difficulty: None,
            question_type: None,
            retrieved_context: Vec::new(),
            retrieval_method: None,
            retrieval_quality: None,
            current_solution: String::new(),
            solution_attempts: Vec::new(),
            verification_passed: false,
            verification_confidence: None,
            verification_issues: Vec::new(),
            explanation: None,
            needs_human: false,
            human_trigger_reason: None,
            status: Status::Processing,
            errors: Vec::new(),
            agent_trace: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// The text downstream collaborators work on: the parsed problem when
    /// parsing produced one, the raw input otherwise.
    pub fn problem_text(&self) -> &str {
        self.parsed_problem
            .as_ref()
            .map(|p| p.problem_text.as_str())
            .unwrap_or(&self.raw_input)
    }

    pub fn has_solution(&self) -> bool {
        !self.current_solution.trim().is_empty()
    }

    /// Human-readable explanation of the current status.
    pub fn reason(&self) -> String {
        match self.status {
            Status::Processing => "request is still being processed".to_string(),
            Status::Success => "problem solved and explained".to_string(),
            Status::NeedsClarification => self
                .clarification_reason
                .clone()
                .unwrap_or_else(|| "the problem statement needs clarification".to_string()),
            Status::NeedsReview => self
                .human_trigger_reason
                .clone()
                .unwrap_or_else(|| "the solution needs human review".to_string()),
            Status::Error => self
                .errors
                .last()
                .map(|e| format!("{}: {}", e.agent, e.message))
                .unwrap_or_else(|| "the request failed".to_string()),
        }
    }

    /// Force the request into `error` without touching the trace.
    pub fn mark_error(&mut self, agent: &str, kind: &str, message: impl Into<String>) {
        self.merge(StateUpdate {
            status: Some(Status::Error),
            errors: vec![ErrorEntry::new(agent, kind, message)],
            finished_at: Some(Utc::now()),
            ..StateUpdate::default()
        });
    }
}

/// Trace agent name recorded for a graph node.
pub fn agent_for_node(node: &str) -> &str {
    match node {
        "parse" => "parser",
        "solve" => "solver",
        "verify" => "verifier",
        "explain" => "explainer",
        "clarify" => "clarification",
        "review" => "review",
        other => other,
    }
}

impl GraphState for PipelineState {
    type Update = StateUpdate;

    fn merge(&mut self, update: StateUpdate) {
        merge::apply(self, update);
    }

    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    fn record_failure(&mut self, node: &str, reason: &str) {
        let agent = agent_for_node(node);
        self.merge(StateUpdate {
            status: Some(Status::Error),
            errors: vec![ErrorEntry::new(agent, "node_failure", reason)],
            agent_trace: vec![TraceEvent::started(agent), TraceEvent::skipped(agent)],
            finished_at: Some(Utc::now()),
            ..StateUpdate::default()
        });
    }

    /// The node's own trace entries are already merged; only the error is
    /// added.
    fn record_routing_failure(&mut self, node: &str, reason: &str) {
        self.merge(StateUpdate {
            status: Some(Status::Error),
            errors: vec![ErrorEntry::new(agent_for_node(node), "routing_failure", reason)],
            finished_at: Some(Utc::now()),
            ..StateUpdate::default()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_processing() {
        let s = PipelineState::new("solve x + 1 = 2", InputType::Text);
        assert_eq!(s.status, Status::Processing);
        assert!(!s.is_terminal());
        assert_eq!(s.problem_text(), "solve x + 1 = 2");
        assert!(s.finished_at.is_none());
    }

    #[test]
    fn record_failure_short_circuits_to_error() {
        let mut s = PipelineState::new("x", InputType::Text);
        s.record_failure("solve", "solver panicked");
        assert_eq!(s.status, Status::Error);
        assert!(s.is_terminal());
        assert_eq!(s.errors.len(), 1);
        assert_eq!(s.errors[0].agent, "solver");
        assert_eq!(s.errors[0].kind, "node_failure");
        let statuses: Vec<_> = s.agent_trace.iter().map(|t| t.status).collect();
        assert_eq!(statuses, vec![TraceStatus::Started, TraceStatus::Skipped]);
        assert_eq!(s.reason(), "solver: solver panicked");
    }

    #[test]
    fn routing_failure_keeps_the_node_trace_intact() {
        let mut s = PipelineState::new("x", InputType::Text);
        s.merge(StateUpdate {
            agent_trace: vec![
                TraceEvent::started("verifier"),
                TraceEvent::completed("verifier", Some(0.9)),
            ],
            ..StateUpdate::default()
        });
        s.record_routing_failure("verify", "router panicked: bad label");

        assert_eq!(s.status, Status::Error);
        assert!(s.finished_at.is_some());
        assert_eq!(s.errors.len(), 1);
        assert_eq!(s.errors[0].agent, "verifier");
        assert_eq!(s.errors[0].kind, "routing_failure");
        let statuses: Vec<_> = s.agent_trace.iter().map(|t| t.status).collect();
        assert_eq!(statuses, vec![TraceStatus::Started, TraceStatus::Completed]);
    }

    #[test]
    fn reason_prefers_recorded_text() {
        let mut s = PipelineState::new("x", InputType::Text);
        s.status = Status::NeedsClarification;
        s.clarification_reason = Some("which variable?".into());
        assert_eq!(s.reason(), "which variable?");

        s.status = Status::NeedsReview;
        assert_eq!(s.reason(), "the solution needs human review");
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&Status::NeedsClarification).unwrap();
        assert_eq!(json, "\"needs_clarification\"");
    }
}
