use crate::errors::MathwiseResult;

/// Embedding generation provider.
pub trait IEmbeddingProvider: Send + Sync {
    /// Embed a single text. Deterministic for a fixed provider version.
    fn embed(&self, text: &str) -> MathwiseResult<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> MathwiseResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Whether this provider is currently available.
    fn is_available(&self) -> bool;
}
