mod collaborators;
mod embedding;
mod retriever;

pub use collaborators::{IExplainer, IParser, ISolver, IVerifier};
pub use embedding::IEmbeddingProvider;
pub use retriever::IRetriever;
