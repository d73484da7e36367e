use serde::{Deserialize, Serialize};

use super::{Difficulty, Topic};
use crate::errors::CollaboratorError;

/// Structured form of a raw math question, produced by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedProblem {
    pub problem_text: String,
    pub topic: Topic,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default = "default_question_type")]
    pub question_type: String,
    #[serde(default)]
    pub needs_clarification: bool,
    #[serde(default)]
    pub ambiguities: Vec<String>,
}

fn default_question_type() -> String {
    "solve".to_string()
}

impl ParsedProblem {
    /// Validate collaborator output against the expected shape.
    ///
    /// The whole input must be one JSON object: surrounding prose, unknown
    /// topics, and a missing or blank `problem_text` are all rejected.
    pub fn from_json_strict(raw: &str) -> Result<Self, CollaboratorError> {
        let parsed: Self =
            serde_json::from_str(raw.trim()).map_err(|e| CollaboratorError::MalformedOutput {
                agent: "parser".to_string(),
                reason: e.to_string(),
            })?;
        if parsed.problem_text.trim().is_empty() {
            return Err(CollaboratorError::MalformedOutput {
                agent: "parser".to_string(),
                reason: "problem_text is blank".to_string(),
            });
        }
        Ok(parsed)
    }

    /// The documented fallback when structuring fails: keep the raw text and
    /// ask the user to clarify.
    pub fn clarification_fallback(raw_input: &str, reason: impl Into<String>) -> Self {
        Self {
            problem_text: raw_input.to_string(),
            topic: Topic::default(),
            difficulty: Difficulty::default(),
            variables: Vec::new(),
            constraints: Vec::new(),
            question_type: default_question_type(),
            needs_clarification: true,
            ambiguities: vec![reason.into()],
        }
    }

    /// True when the parser flagged the problem or left ambiguities open.
    pub fn requires_clarification(&self) -> bool {
        self.needs_clarification || !self.ambiguities.is_empty()
    }
}
