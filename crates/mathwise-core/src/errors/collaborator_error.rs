/// Failures of external collaborators (parser, solver, verifier, explainer,
/// embedder). Always recovered inside a pipeline node.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{agent} timed out after {after_ms} ms")]
    Timeout { agent: String, after_ms: u64 },

    #[error("{agent} failed: {reason}")]
    Failed { agent: String, reason: String },

    #[error("{agent} panicked")]
    Panicked { agent: String },

    #[error("{agent} returned malformed output: {reason}")]
    MalformedOutput { agent: String, reason: String },
}

impl CollaboratorError {
    /// Short machine-readable kind, recorded in pipeline error entries.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Failed { .. } => "failed",
            Self::Panicked { .. } => "panicked",
            Self::MalformedOutput { .. } => "malformed_output",
        }
    }
}
