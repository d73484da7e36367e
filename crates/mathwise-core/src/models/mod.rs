mod degradation_event;
mod document;
mod input;
mod problem;
mod retrieval_result;
mod solve_output;
mod verification;

pub use degradation_event::DegradationEvent;
pub use document::{DocType, Document, DocumentMetadata};
pub use input::{Difficulty, InputType, Topic};
pub use problem::ParsedProblem;
pub use retrieval_result::RetrievalResult;
pub use solve_output::SolveOutput;
pub use verification::VerificationReport;
