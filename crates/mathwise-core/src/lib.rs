//! # mathwise-core
//!
//! Foundation crate for the mathwise solve pipeline.
//! Defines the document and retrieval models, the collaborator traits,
//! per-subsystem errors, configuration, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::MathwiseConfig;
pub use errors::{MathwiseError, MathwiseResult};
pub use models::{
    DocType, Document, DocumentMetadata, InputType, ParsedProblem, RetrievalResult, Topic,
};
