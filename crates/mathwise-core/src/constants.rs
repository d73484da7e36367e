/// Reciprocal-rank-fusion damping constant.
pub const RRF_K: u32 = 60;

/// Math glyphs the lexical tokenizer keeps as standalone tokens.
pub const MATH_SYMBOLS: &str = "∫∂∇√±×÷≠≤≥∈∉⊂⊃∩∪";

/// Superscript digits the lexical tokenizer keeps as standalone tokens.
pub const SUPERSCRIPT_DIGITS: &str = "²³⁴⁵⁶⁷⁸⁹⁰";

/// Confidence recorded when the verifier cannot produce a judgement.
pub const VERIFIER_FALLBACK_CONFIDENCE: f64 = 0.5;

/// Explanation text used when no solution exists to explain.
pub const NO_SOLUTION_EXPLANATION: &str =
    "The solver could not generate a solution. Please try rephrasing your problem.";

/// Explanation text used when explanation generation itself failed.
pub const EXPLANATION_FAILED: &str = "Explanation generation failed.";

/// Explanation text recorded when the explain step finds no solution.
pub const NOTHING_TO_EXPLAIN: &str = "No solution was generated to explain.";
