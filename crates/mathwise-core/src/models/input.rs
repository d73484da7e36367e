use serde::{Deserialize, Serialize};

/// Where the raw request came from. Front ends are external; the pipeline
/// only records the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    #[default]
    Text,
    Image,
    Audio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    #[default]
    Algebra,
    Calculus,
    Probability,
    LinearAlgebra,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Algebra => "algebra",
            Topic::Calculus => "calculus",
            Topic::Probability => "probability",
            Topic::LinearAlgebra => "linear_algebra",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}
