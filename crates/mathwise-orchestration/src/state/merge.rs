//! Field-level merge policy for [`PipelineState`](super::PipelineState).

use chrono::{DateTime, Utc};

use mathwise_core::models::{Difficulty, ParsedProblem, RetrievalResult, Topic};

use super::{ErrorEntry, PipelineState, SolutionAttempt, Status, TraceEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Last writer wins. An absent value leaves the field untouched.
    Replace,
    /// New entries are appended; existing entries are never dropped.
    Append,
}

/// Every field a node may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateField {
    Status,
    ParsedProblem,
    NeedsClarification,
    ClarificationReason,
    Topic,
    Difficulty,
    QuestionType,
    RetrievedContext,
    RetrievalMethod,
    RetrievalQuality,
    CurrentSolution,
    SolutionAttempts,
    VerificationPassed,
    VerificationConfidence,
    VerificationIssues,
    Explanation,
    NeedsHuman,
    HumanTriggerReason,
    Errors,
    AgentTrace,
    FinishedAt,
}

impl StateField {
    pub const ALL: [StateField; 21] = [
        StateField::Status,
        StateField::ParsedProblem,
        StateField::NeedsClarification,
        StateField::ClarificationReason,
        StateField::Topic,
        StateField::Difficulty,
        StateField::QuestionType,
        StateField::RetrievedContext,
        StateField::RetrievalMethod,
        StateField::RetrievalQuality,
        StateField::CurrentSolution,
        StateField::SolutionAttempts,
        StateField::VerificationPassed,
        StateField::VerificationConfidence,
        StateField::VerificationIssues,
        StateField::Explanation,
        StateField::NeedsHuman,
        StateField::HumanTriggerReason,
        StateField::Errors,
        StateField::AgentTrace,
        StateField::FinishedAt,
    ];
}

/// The merge table consulted for every field of every update.
pub static MERGE_POLICIES: &[(StateField, MergePolicy)] = &[
    (StateField::Status, MergePolicy::Replace),
    (StateField::ParsedProblem, MergePolicy::Replace),
    (StateField::NeedsClarification, MergePolicy::Replace),
    (StateField::ClarificationReason, MergePolicy::Replace),
    (StateField::Topic, MergePolicy::Replace),
    (StateField::Difficulty, MergePolicy::Replace),
    (StateField::QuestionType, MergePolicy::Replace),
    (StateField::RetrievedContext, MergePolicy::Append),
    (StateField::RetrievalMethod, MergePolicy::Replace),
    (StateField::RetrievalQuality, MergePolicy::Replace),
    (StateField::CurrentSolution, MergePolicy::Replace),
    (StateField::SolutionAttempts, MergePolicy::Append),
    (StateField::VerificationPassed, MergePolicy::Replace),
    (StateField::VerificationConfidence, MergePolicy::Replace),
    (StateField::VerificationIssues, MergePolicy::Append),
    (StateField::Explanation, MergePolicy::Replace),
    (StateField::NeedsHuman, MergePolicy::Replace),
    (StateField::HumanTriggerReason, MergePolicy::Replace),
    (StateField::Errors, MergePolicy::Append),
    (StateField::AgentTrace, MergePolicy::Append),
    (StateField::FinishedAt, MergePolicy::Replace),
];

impl MergePolicy {
    /// Policy declared for `field`. Fields missing from the table replace.
    pub fn of(field: StateField) -> MergePolicy {
        MERGE_POLICIES
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, p)| *p)
            .unwrap_or(MergePolicy::Replace)
    }
}

/// A node's partial output. `None` / empty means "not written".
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub status: Option<Status>,
    pub parsed_problem: Option<ParsedProblem>,
    pub needs_clarification: Option<bool>,
    pub clarification_reason: Option<String>,
    pub topic: Option<Topic>,
    pub difficulty: Option<Difficulty>,
    pub question_type: Option<String>,
    pub retrieved_context: Vec<RetrievalResult>,
    pub retrieval_method: Option<String>,
    pub retrieval_quality: Option<f64>,
    pub current_solution: Option<String>,
    pub solution_attempts: Vec<SolutionAttempt>,
    pub verification_passed: Option<bool>,
    pub verification_confidence: Option<f64>,
    pub verification_issues: Vec<String>,
    pub explanation: Option<String>,
    pub needs_human: Option<bool>,
    pub human_trigger_reason: Option<String>,
    pub errors: Vec<ErrorEntry>,
    pub agent_trace: Vec<TraceEvent>,
    pub finished_at: Option<DateTime<Utc>>,
}

fn merge_value<T>(field: StateField, target: &mut T, value: Option<T>) {
    debug_assert_eq!(MergePolicy::of(field), MergePolicy::Replace, "{field:?}");
    if let Some(v) = value {
        *target = v;
    }
}

fn merge_list<T>(field: StateField, target: &mut Vec<T>, values: Vec<T>) {
    match MergePolicy::of(field) {
        MergePolicy::Append => target.extend(values),
        MergePolicy::Replace => {
            if !values.is_empty() {
                *target = values;
            }
        }
    }
}

pub(super) fn apply(state: &mut PipelineState, u: StateUpdate) {
    use StateField as F;

    merge_value(F::Status, &mut state.status, u.status);
    merge_value(F::ParsedProblem, &mut state.parsed_problem, u.parsed_problem.map(Some));
    merge_value(F::NeedsClarification, &mut state.needs_clarification, u.needs_clarification);
    merge_value(
        F::ClarificationReason,
        &mut state.clarification_reason,
        u.clarification_reason.map(Some),
    );
    merge_value(F::Topic, &mut state.topic, u.topic.map(Some));
    merge_value(F::Difficulty, &mut state.difficulty, u.difficulty.map(Some));
    merge_value(F::QuestionType, &mut state.question_type, u.question_type.map(Some));
    merge_list(F::RetrievedContext, &mut state.retrieved_context, u.retrieved_context);
    merge_value(
        F::RetrievalMethod,
        &mut state.retrieval_method,
        u.retrieval_method.map(Some),
    );
    merge_value(
        F::RetrievalQuality,
        &mut state.retrieval_quality,
        u.retrieval_quality.map(Some),
    );
    merge_value(F::CurrentSolution, &mut state.current_solution, u.current_solution);
    merge_list(F::SolutionAttempts, &mut state.solution_attempts, u.solution_attempts);
    merge_value(F::VerificationPassed, &mut state.verification_passed, u.verification_passed);
    merge_value(
        F::VerificationConfidence,
        &mut state.verification_confidence,
        u.verification_confidence.map(Some),
    );
    merge_list(F::VerificationIssues, &mut state.verification_issues, u.verification_issues);
    merge_value(F::Explanation, &mut state.explanation, u.explanation.map(Some));
    merge_value(F::NeedsHuman, &mut state.needs_human, u.needs_human);
    merge_value(
        F::HumanTriggerReason,
        &mut state.human_trigger_reason,
        u.human_trigger_reason.map(Some),
    );
    merge_list(F::Errors, &mut state.errors, u.errors);
    merge_list(F::AgentTrace, &mut state.agent_trace, u.agent_trace);
    merge_value(F::FinishedAt, &mut state.finished_at, u.finished_at.map(Some));
}
