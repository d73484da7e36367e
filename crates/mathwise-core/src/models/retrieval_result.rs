use serde::{Deserialize, Serialize};

use super::Document;

/// One ranked hit. `fused_score` is the only score always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub document: Document,
    /// 1-based rank in the dense list.
    pub dense_rank: Option<usize>,
    /// 1-based rank in the sparse list.
    pub sparse_rank: Option<usize>,
    /// Cosine similarity (`1 - distance`).
    pub dense_score: Option<f64>,
    /// BM25 relevance.
    pub sparse_score: Option<f64>,
    pub fused_score: f64,
}

impl RetrievalResult {
    pub fn id(&self) -> &str {
        &self.document.id
    }
}
