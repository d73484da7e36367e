//! Contracts for the language-model collaborators driven by the pipeline.
//!
//! Implementations are synchronous; the orchestration layer wraps every call
//! with a timeout.

use crate::errors::MathwiseResult;
use crate::models::{ParsedProblem, RetrievalResult, SolveOutput, Topic, VerificationReport};

/// Structures raw input into a [`ParsedProblem`].
pub trait IParser: Send + Sync {
    /// Must always return a value. Malformed internal output degrades to
    /// [`ParsedProblem::clarification_fallback`].
    fn parse(&self, raw_input: &str) -> ParsedProblem;
}

/// Generates a candidate solution from the problem and supporting documents.
pub trait ISolver: Send + Sync {
    fn solve(
        &self,
        problem_text: &str,
        topic: Topic,
        context: &[RetrievalResult],
    ) -> MathwiseResult<SolveOutput>;
}

/// Scores a candidate solution.
pub trait IVerifier: Send + Sync {
    fn verify(&self, problem_text: &str, solution: &str) -> MathwiseResult<VerificationReport>;
}

/// Produces a student-facing explanation of a solution.
pub trait IExplainer: Send + Sync {
    fn explain(&self, problem_text: &str, solution: &str) -> MathwiseResult<String>;
}
