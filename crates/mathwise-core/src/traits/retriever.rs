use crate::errors::MathwiseResult;
use crate::models::{Document, RetrievalResult};

/// Engine-facing search surface over the knowledge corpus.
///
/// Search never fails: an empty or unreachable index yields an empty list.
pub trait IRetriever: Send + Sync {
    /// Dense-only search.
    fn search(&self, query: &str, top_k: usize) -> Vec<RetrievalResult>;

    /// Weighted reciprocal-rank fusion of dense and sparse rankings.
    fn hybrid_search(
        &self,
        query: &str,
        top_k: usize,
        dense_weight: f64,
        sparse_weight: f64,
    ) -> Vec<RetrievalResult>;

    /// Hybrid search with formula/template/example coverage.
    fn search_diverse(
        &self,
        query: &str,
        top_k: usize,
        dense_weight: f64,
        sparse_weight: f64,
    ) -> Vec<RetrievalResult>;

    /// Add a batch of documents, rebuilding the indexes.
    fn add_documents(&self, documents: Vec<Document>) -> MathwiseResult<()>;

    fn document_count(&self) -> usize;
}
