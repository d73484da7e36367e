use serde::{Deserialize, Serialize};

use super::defaults;

/// Retrieval subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// RRF damping constant for rank fusion.
    pub rrf_k: u32,
    /// Default number of results returned by a search.
    pub top_k: usize,
    /// Weight of the dense (embedding) ranking in fusion.
    pub dense_weight: f64,
    /// Weight of the sparse (BM25) ranking in fusion.
    pub sparse_weight: f64,
    /// Candidate over-fetch factor for diversity selection.
    pub overfetch_factor: usize,
    /// Each ranked list fetches `candidate_multiplier * k` hits before fusion.
    pub candidate_multiplier: usize,
    /// Number of supporting documents the solve step retrieves.
    pub solve_top_k: usize,
    /// BM25 term-frequency saturation.
    pub bm25_k1: f64,
    /// BM25 length normalization.
    pub bm25_b: f64,
    /// Directory holding formulas/, templates/ and examples/.
    pub knowledge_base_path: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            rrf_k: defaults::DEFAULT_RRF_K,
            top_k: defaults::DEFAULT_TOP_K,
            dense_weight: defaults::DEFAULT_DENSE_WEIGHT,
            sparse_weight: defaults::DEFAULT_SPARSE_WEIGHT,
            overfetch_factor: defaults::DEFAULT_OVERFETCH_FACTOR,
            candidate_multiplier: defaults::DEFAULT_CANDIDATE_MULTIPLIER,
            solve_top_k: defaults::DEFAULT_SOLVE_TOP_K,
            bm25_k1: defaults::DEFAULT_BM25_K1,
            bm25_b: defaults::DEFAULT_BM25_B,
            knowledge_base_path: defaults::DEFAULT_KNOWLEDGE_BASE_PATH.to_string(),
        }
    }
}
