use super::{CollaboratorError, ConfigError, EmbeddingError, GraphError, RetrievalError};

/// Top-level error aggregating subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum MathwiseError {
    #[error("retrieval error: {0}")]
    RetrievalError(#[from] RetrievalError),

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("graph configuration error: {0}")]
    GraphError(#[from] GraphError),

    #[error("collaborator error: {0}")]
    CollaboratorError(#[from] CollaboratorError),

    #[error("configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("concurrency error: {0}")]
    ConcurrencyError(String),
}

pub type MathwiseResult<T> = Result<T, MathwiseError>;
