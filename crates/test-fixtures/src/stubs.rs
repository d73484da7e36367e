//! Deterministic collaborators for pipeline tests.
//!
//! Every stub counts its calls so tests can assert which collaborators ran.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use mathwise_core::errors::{CollaboratorError, MathwiseResult};
use mathwise_core::models::{
    ParsedProblem, RetrievalResult, SolveOutput, Topic, VerificationReport,
};
use mathwise_core::traits::{IExplainer, IParser, ISolver, IVerifier};

#[derive(Debug, Default)]
pub struct CallCounter(AtomicUsize);

impl CallCounter {
    fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

fn failed(agent: &str, reason: &str) -> CollaboratorError {
    CollaboratorError::Failed {
        agent: agent.to_string(),
        reason: reason.to_string(),
    }
}

// --- Parser ---

/// Structures input by pushing a canned response through the strict
/// schema boundary, falling back to clarification when it is malformed.
pub struct StubParser {
    response: String,
    pub calls: CallCounter,
}

impl StubParser {
    /// Parser whose model "answers" with `response` for every input.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            calls: CallCounter::default(),
        }
    }

    /// A well-formed, unambiguous algebra problem; `problem_text` echoes the
    /// raw input.
    pub fn solvable() -> Self {
        Self::with_response("")
    }

    /// Output that flags an ambiguity.
    pub fn ambiguous(ambiguity: &str) -> Self {
        Self::with_response(
            serde_json::json!({
                "problem_text": "find x",
                "topic": "algebra",
                "needs_clarification": true,
                "ambiguities": [ambiguity],
            })
            .to_string(),
        )
    }
}

impl IParser for StubParser {
    fn parse(&self, raw_input: &str) -> ParsedProblem {
        self.calls.hit();
        let response = if self.response.is_empty() {
            serde_json::json!({ "problem_text": raw_input, "topic": "algebra" }).to_string()
        } else {
            self.response.clone()
        };
        ParsedProblem::from_json_strict(&response)
            .unwrap_or_else(|e| ParsedProblem::clarification_fallback(raw_input, e.to_string()))
    }
}

/// Parser that sleeps for `delay` before answering.
pub struct SlowParser {
    pub delay: Duration,
}

impl IParser for SlowParser {
    fn parse(&self, raw_input: &str) -> ParsedProblem {
        thread::sleep(self.delay);
        StubParser::solvable().parse(raw_input)
    }
}

// --- Solver ---

/// Deterministic solver: the solution names the problem and cites the
/// documents it was given.
#[derive(Default)]
pub struct StubSolver {
    pub calls: CallCounter,
}

impl ISolver for StubSolver {
    fn solve(
        &self,
        problem_text: &str,
        topic: Topic,
        context: &[RetrievalResult],
    ) -> MathwiseResult<SolveOutput> {
        self.calls.hit();
        Ok(SolveOutput {
            solution: format!(
                "Solved '{problem_text}' ({}) with {} references",
                topic.as_str(),
                context.len()
            ),
            tool_used: None,
            citations: context.iter().map(|r| r.document.id.clone()).collect(),
        })
    }
}

/// Solver that returns an empty solution.
pub struct BlankSolver;

impl ISolver for BlankSolver {
    fn solve(&self, _: &str, _: Topic, _: &[RetrievalResult]) -> MathwiseResult<SolveOutput> {
        Ok(SolveOutput::default())
    }
}

pub struct FailingSolver;

impl ISolver for FailingSolver {
    fn solve(&self, _: &str, _: Topic, _: &[RetrievalResult]) -> MathwiseResult<SolveOutput> {
        Err(failed("solver", "model unavailable").into())
    }
}

pub struct SlowSolver {
    pub delay: Duration,
}

impl ISolver for SlowSolver {
    fn solve(
        &self,
        problem_text: &str,
        topic: Topic,
        context: &[RetrievalResult],
    ) -> MathwiseResult<SolveOutput> {
        thread::sleep(self.delay);
        StubSolver::default().solve(problem_text, topic, context)
    }
}

pub struct PanickingSolver;

impl ISolver for PanickingSolver {
    fn solve(&self, _: &str, _: Topic, _: &[RetrievalResult]) -> MathwiseResult<SolveOutput> {
        panic!("solver blew up")
    }
}

// --- Verifier ---

/// Verifier returning a fixed confidence; passes at or above 0.6.
pub struct StubVerifier {
    pub confidence: f64,
    pub calls: CallCounter,
}

impl StubVerifier {
    pub fn with_confidence(confidence: f64) -> Self {
        Self {
            confidence,
            calls: CallCounter::default(),
        }
    }
}

impl IVerifier for StubVerifier {
    fn verify(&self, _problem_text: &str, _solution: &str) -> MathwiseResult<VerificationReport> {
        self.calls.hit();
        Ok(VerificationReport {
            verification_passed: self.confidence >= 0.6,
            confidence: self.confidence,
            issues: if self.confidence < 0.6 {
                vec!["low confidence".to_string()]
            } else {
                Vec::new()
            },
            feedback: String::new(),
        })
    }
}

pub struct FailingVerifier;

impl IVerifier for FailingVerifier {
    fn verify(&self, _: &str, _: &str) -> MathwiseResult<VerificationReport> {
        Err(failed("verifier", "model unavailable").into())
    }
}

// --- Explainer ---

#[derive(Default)]
pub struct StubExplainer {
    pub calls: CallCounter,
}

impl IExplainer for StubExplainer {
    fn explain(&self, _problem_text: &str, solution: &str) -> MathwiseResult<String> {
        self.calls.hit();
        Ok(format!("Step by step: {solution}"))
    }
}

pub struct FailingExplainer;

impl IExplainer for FailingExplainer {
    fn explain(&self, _: &str, _: &str) -> MathwiseResult<String> {
        Err(failed("explainer", "model unavailable").into())
    }
}
