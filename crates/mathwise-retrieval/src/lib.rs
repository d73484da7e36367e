//! # mathwise-retrieval
//!
//! Hybrid retrieval over the math knowledge corpus: exact cosine search,
//! BM25 over a math-aware tokenizer, weighted reciprocal rank fusion, and
//! formula/template/example diversity selection. The corpus lives in
//! immutable snapshots swapped atomically on every ingestion batch.

pub mod engine;
pub mod ingest;
pub mod search;
pub mod tokenizer;

pub use engine::{CorpusSnapshot, HybridRetriever, SearchFilter};
pub use ingest::{ingest_knowledge_base, load_knowledge_base, IngestReport};
