use serde::{Deserialize, Serialize};

use crate::constants::VERIFIER_FALLBACK_CONFIDENCE;
use crate::errors::CollaboratorError;

/// Verdict on a candidate solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub verification_passed: bool,
    pub confidence: f64,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub feedback: String,
}

impl VerificationReport {
    /// Validate verifier output. `confidence` must lie in `[0, 1]`.
    pub fn from_json_strict(raw: &str) -> Result<Self, CollaboratorError> {
        let report: Self =
            serde_json::from_str(raw.trim()).map_err(|e| CollaboratorError::MalformedOutput {
                agent: "verifier".to_string(),
                reason: e.to_string(),
            })?;
        if !(0.0..=1.0).contains(&report.confidence) {
            return Err(CollaboratorError::MalformedOutput {
                agent: "verifier".to_string(),
                reason: format!("confidence {} outside [0, 1]", report.confidence),
            });
        }
        Ok(report)
    }

    /// Heuristic used when the verifier itself broke: not passed, medium
    /// confidence. The reason is kept in `feedback`.
    pub fn conservative_default(reason: impl Into<String>) -> Self {
        Self {
            verification_passed: false,
            confidence: VERIFIER_FALLBACK_CONFIDENCE,
            issues: Vec::new(),
            feedback: reason.into(),
        }
    }
}
