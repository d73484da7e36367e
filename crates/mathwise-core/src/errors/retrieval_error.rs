/// Retrieval subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("duplicate document id: {id}")]
    DuplicateDocument { id: String },

    #[error("embedding count mismatch: {documents} documents, {embeddings} embeddings")]
    EmbeddingCountMismatch { documents: usize, embeddings: usize },

    #[error("knowledge base not found: {path}")]
    KnowledgeBaseNotFound { path: String },

    #[error("search failed: {reason}")]
    SearchFailed { reason: String },
}
