use serde::{Deserialize, Serialize};

/// Output of the solution generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveOutput {
    pub solution: String,
    #[serde(default)]
    pub tool_used: Option<String>,
    #[serde(default)]
    pub citations: Vec<String>,
}
