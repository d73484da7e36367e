//! Error handling for mathwise.
//! One error enum per subsystem, `thiserror` only.

mod collaborator_error;
mod config_error;
mod embedding_error;
mod graph_error;
mod mathwise_error;
mod retrieval_error;

pub use collaborator_error::CollaboratorError;
pub use config_error::ConfigError;
pub use embedding_error::EmbeddingError;
pub use graph_error::GraphError;
pub use mathwise_error::{MathwiseError, MathwiseResult};
pub use retrieval_error::RetrievalError;
