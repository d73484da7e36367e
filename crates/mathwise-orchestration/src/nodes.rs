//! The six nodes of the solve pipeline and its two routers.
//!
//! Every collaborator call goes through the [`CallGuard`]. Failures are
//! recovered here into `errors` / `agent_trace` entries plus a fallback
//! value, so nodes only return `Err` for faults in the pipeline itself.

use std::sync::{Arc, Mutex};

use chrono::Utc;

use mathwise_core::config::{PipelineConfig, RetrievalConfig};
use mathwise_core::constants::{EXPLANATION_FAILED, NOTHING_TO_EXPLAIN, NO_SOLUTION_EXPLANATION};
use mathwise_core::errors::{CollaboratorError, MathwiseResult};
use mathwise_core::models::{ParsedProblem, VerificationReport};
use mathwise_core::traits::IRetriever;
use mathwise_observability::{events, MetricsCollector};

use crate::graph::RouteLabel;
use crate::guard::CallGuard;
use crate::pipeline::Collaborators;
use crate::state::{ErrorEntry, PipelineState, SolutionAttempt, StateUpdate, Status, TraceEvent};

/// Method recorded in `retrieval_method` by the solve node.
pub const RETRIEVAL_METHOD: &str = "hybrid_diverse";

/// Everything the nodes share. Built once per pipeline.
pub(crate) struct NodeContext {
    pub retriever: Arc<dyn IRetriever>,
    pub collaborators: Collaborators,
    pub guard: CallGuard,
    pub retrieval: RetrievalConfig,
    pub pipeline: PipelineConfig,
    pub metrics: Arc<Mutex<MetricsCollector>>,
}

impl NodeContext {
    fn record_retrieval(&self, top_score: Option<f64>) {
        let mut metrics = match self.metrics.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        metrics.retrieval.record_query(top_score);
    }
}

// --- Routing ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseRoute {
    Clarify,
    Solve,
}

impl RouteLabel for ParseRoute {
    const ALL: &'static [Self] = &[ParseRoute::Clarify, ParseRoute::Solve];

    fn name(self) -> &'static str {
        match self {
            ParseRoute::Clarify => "needs_clarification",
            ParseRoute::Solve => "solvable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyRoute {
    Review,
    Explain,
}

impl RouteLabel for VerifyRoute {
    const ALL: &'static [Self] = &[VerifyRoute::Review, VerifyRoute::Explain];

    fn name(self) -> &'static str {
        match self {
            VerifyRoute::Review => "needs_human",
            VerifyRoute::Explain => "verified",
        }
    }
}

pub fn route_after_parse(state: &PipelineState) -> ParseRoute {
    if state.needs_clarification {
        ParseRoute::Clarify
    } else {
        ParseRoute::Solve
    }
}

pub fn route_after_verify(state: &PipelineState) -> VerifyRoute {
    if state.needs_human {
        VerifyRoute::Review
    } else {
        VerifyRoute::Explain
    }
}

/// Log a degradation and turn the failure into an error entry.
fn degrade(component: &str, error: &CollaboratorError, fallback: &str) -> ErrorEntry {
    let message = error.to_string();
    events::degradation_triggered(component, &message, fallback);
    ErrorEntry::recovered(component, error.kind(), message)
}

// --- Nodes ---

pub(crate) fn parse(ctx: &NodeContext, state: &PipelineState) -> MathwiseResult<StateUpdate> {
    const AGENT: &str = "parser";
    let started = TraceEvent::started(AGENT);

    let parser = Arc::clone(&ctx.collaborators.parser);
    let raw = state.raw_input.clone();
    let (parsed, finished, errors) = match ctx.guard.call(AGENT, move || Ok(parser.parse(&raw))) {
        Ok(parsed) => {
            let confidence = if parsed.requires_clarification() { 0.5 } else { 1.0 };
            (parsed, TraceEvent::completed(AGENT, Some(confidence)), Vec::new())
        }
        Err(e) => {
            let entry = degrade(AGENT, &e, "clarification_fallback");
            let fallback = ParsedProblem::clarification_fallback(&state.raw_input, e.to_string());
            (fallback, TraceEvent::skipped(AGENT), vec![entry])
        }
    };

    let needs_clarification = parsed.requires_clarification();
    let clarification_reason = if !parsed.ambiguities.is_empty() {
        Some(parsed.ambiguities.join(", "))
    } else if needs_clarification {
        Some("the parser asked for clarification".to_string())
    } else {
        None
    };

    Ok(StateUpdate {
        topic: Some(parsed.topic),
        difficulty: Some(parsed.difficulty),
        question_type: Some(parsed.question_type.clone()),
        needs_clarification: Some(needs_clarification),
        clarification_reason,
        parsed_problem: Some(parsed),
        errors,
        agent_trace: vec![started, finished],
        ..StateUpdate::default()
    })
}

pub(crate) fn solve(ctx: &NodeContext, state: &PipelineState) -> MathwiseResult<StateUpdate> {
    const AGENT: &str = "solver";
    let started = TraceEvent::started(AGENT);
    let problem = state.problem_text().to_string();
    let topic = state.topic.unwrap_or_default();
    let mut errors = Vec::new();

    let retriever = Arc::clone(&ctx.retriever);
    let query = problem.clone();
    let (k, wd, ws) = (
        ctx.retrieval.solve_top_k,
        ctx.retrieval.dense_weight,
        ctx.retrieval.sparse_weight,
    );
    let context = match ctx
        .guard
        .call("retriever", move || Ok(retriever.search_diverse(&query, k, wd, ws)))
    {
        Ok(results) => results,
        Err(e) => {
            errors.push(degrade("retriever", &e, "empty_context"));
            Vec::new()
        }
    };

    // Diverse results are seeded by category, so the best fused score is
    // not necessarily first.
    let quality = context.iter().map(|r| r.fused_score).fold(0.0, f64::max);
    ctx.record_retrieval((!context.is_empty()).then_some(quality));

    let solver = Arc::clone(&ctx.collaborators.solver);
    let docs = context.clone();
    let outcome = ctx
        .guard
        .call(AGENT, move || solver.solve(&problem, topic, &docs));

    let mut update = StateUpdate {
        retrieved_context: context,
        retrieval_method: Some(RETRIEVAL_METHOD.to_string()),
        retrieval_quality: Some(quality),
        ..StateUpdate::default()
    };
    match outcome {
        Ok(output) => {
            update.solution_attempts = vec![SolutionAttempt {
                attempt: state.solution_attempts.len() + 1,
                solution: output.solution.clone(),
                tool_used: output.tool_used,
                citations: output.citations,
            }];
            update.current_solution = Some(output.solution);
            update.agent_trace = vec![started, TraceEvent::completed(AGENT, None)];
        }
        Err(e) => {
            errors.push(degrade(AGENT, &e, "empty_solution"));
            update.current_solution = Some(String::new());
            update.agent_trace = vec![started, TraceEvent::skipped(AGENT)];
        }
    }
    update.errors = errors;
    Ok(update)
}

pub(crate) fn verify(ctx: &NodeContext, state: &PipelineState) -> MathwiseResult<StateUpdate> {
    const AGENT: &str = "verifier";
    let started = TraceEvent::started(AGENT);

    if !state.has_solution() {
        return Ok(StateUpdate {
            verification_passed: Some(false),
            verification_confidence: Some(0.0),
            verification_issues: vec!["Solver did not produce a solution".to_string()],
            needs_human: Some(true),
            human_trigger_reason: Some("Solver failed to produce output".to_string()),
            agent_trace: vec![started, TraceEvent::skipped(AGENT)],
            ..StateUpdate::default()
        });
    }

    let verifier = Arc::clone(&ctx.collaborators.verifier);
    let problem = state.problem_text().to_string();
    let solution = state.current_solution.clone();
    let outcome = ctx.guard.call(AGENT, move || {
        let report = verifier.verify(&problem, &solution)?;
        if !(0.0..=1.0).contains(&report.confidence) {
            return Err(CollaboratorError::MalformedOutput {
                agent: AGENT.to_string(),
                reason: format!("confidence {} outside [0, 1]", report.confidence),
            }
            .into());
        }
        Ok(report)
    });

    let (report, finished, errors) = match outcome {
        Ok(report) => {
            let finished = TraceEvent::completed(AGENT, Some(report.confidence));
            (report, finished, Vec::new())
        }
        Err(e) => {
            let entry = degrade(AGENT, &e, "conservative_default");
            let report = VerificationReport::conservative_default(e.to_string());
            (report, TraceEvent::skipped(AGENT), vec![entry])
        }
    };

    let needs_human =
        ctx.pipeline.hitl_enabled && report.confidence < ctx.pipeline.confidence_threshold;
    let human_trigger_reason = needs_human.then(|| {
        format!(
            "Low verification confidence: {:.0}%",
            report.confidence * 100.0
        )
    });

    Ok(StateUpdate {
        verification_passed: Some(report.verification_passed),
        verification_confidence: Some(report.confidence),
        verification_issues: report.issues,
        needs_human: Some(needs_human),
        human_trigger_reason,
        errors,
        agent_trace: vec![started, finished],
        ..StateUpdate::default()
    })
}

pub(crate) fn explain(ctx: &NodeContext, state: &PipelineState) -> MathwiseResult<StateUpdate> {
    const AGENT: &str = "explainer";
    let started = TraceEvent::started(AGENT);

    if !state.has_solution() {
        return Ok(StateUpdate {
            status: Some(Status::Error),
            explanation: Some(NOTHING_TO_EXPLAIN.to_string()),
            errors: vec![ErrorEntry::new(AGENT, "missing_solution", NOTHING_TO_EXPLAIN)],
            agent_trace: vec![started, TraceEvent::skipped(AGENT)],
            finished_at: Some(Utc::now()),
            ..StateUpdate::default()
        });
    }

    let explainer = Arc::clone(&ctx.collaborators.explainer);
    let problem = state.problem_text().to_string();
    let solution = state.current_solution.clone();
    let update = match ctx
        .guard
        .call(AGENT, move || explainer.explain(&problem, &solution))
    {
        Ok(text) => StateUpdate {
            status: Some(Status::Success),
            explanation: Some(text),
            agent_trace: vec![started, TraceEvent::completed(AGENT, None)],
            ..StateUpdate::default()
        },
        Err(e) => StateUpdate {
            status: Some(Status::Error),
            errors: vec![ErrorEntry::new(AGENT, e.kind(), e.to_string())],
            agent_trace: vec![started, TraceEvent::skipped(AGENT)],
            ..StateUpdate::default()
        },
    };
    Ok(StateUpdate {
        finished_at: Some(Utc::now()),
        ..update
    })
}

pub(crate) fn clarify(_ctx: &NodeContext, _state: &PipelineState) -> MathwiseResult<StateUpdate> {
    const AGENT: &str = "clarification";
    Ok(StateUpdate {
        status: Some(Status::NeedsClarification),
        needs_clarification: Some(true),
        agent_trace: vec![
            TraceEvent::started(AGENT),
            TraceEvent::completed(AGENT, None),
        ],
        finished_at: Some(Utc::now()),
        ..StateUpdate::default()
    })
}

/// Hand the request to a human. A draft explanation is still attempted so
/// the reviewer has something to evaluate; solve and verify never rerun.
pub(crate) fn review(ctx: &NodeContext, state: &PipelineState) -> MathwiseResult<StateUpdate> {
    const AGENT: &str = "review";
    let started = TraceEvent::started(AGENT);
    let mut errors = Vec::new();

    let explanation = if state.has_solution() {
        let explainer = Arc::clone(&ctx.collaborators.explainer);
        let problem = state.problem_text().to_string();
        let solution = state.current_solution.clone();
        match ctx
            .guard
            .call("explainer", move || explainer.explain(&problem, &solution))
        {
            Ok(text) => text,
            Err(e) => {
                errors.push(degrade("explainer", &e, "explanation_failed"));
                EXPLANATION_FAILED.to_string()
            }
        }
    } else {
        NO_SOLUTION_EXPLANATION.to_string()
    };

    Ok(StateUpdate {
        status: Some(Status::NeedsReview),
        needs_human: Some(true),
        explanation: Some(explanation),
        errors,
        agent_trace: vec![started, TraceEvent::completed(AGENT, None)],
        finished_at: Some(Utc::now()),
        ..StateUpdate::default()
    })
}
