//! HybridRetriever: the engine-facing search surface.
//!
//! The corpus is held in an immutable [`CorpusSnapshot`]. Readers clone the
//! current `Arc` and search it without holding any lock; `add_documents`
//! builds a complete replacement snapshot and swaps it in. A query therefore
//! sees either the old corpus or the new one, never a half-built index.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock};

use mathwise_core::config::RetrievalConfig;
use mathwise_core::errors::{MathwiseError, MathwiseResult, RetrievalError};
use mathwise_core::models::{DocType, Document, RetrievalResult};
use mathwise_core::traits::{IEmbeddingProvider, IRetriever};
use mathwise_observability::events;
use tracing::{debug, info, warn};

use crate::search::{
    fuse, select_diverse, Bm25Index, DenseIndex, FusedCandidate, FusionWeights, RankedHit,
};

/// One immutable generation of the corpus and its indexes.
#[derive(Debug)]
pub struct CorpusSnapshot {
    documents: Vec<Document>,
    ids: HashSet<String>,
    dense: DenseIndex,
    sparse: Bm25Index,
    generation: u64,
}

impl CorpusSnapshot {
    fn empty(config: &RetrievalConfig, generation: u64) -> Self {
        Self {
            documents: Vec::new(),
            ids: HashSet::new(),
            dense: DenseIndex::default(),
            sparse: Bm25Index::build::<&str>(&[], config.bm25_k1, config.bm25_b),
            generation,
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}

/// Restricts a dense search to one category and/or topic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub doc_type: Option<DocType>,
    pub topic: Option<String>,
}

impl SearchFilter {
    pub fn doc_type(doc_type: DocType) -> Self {
        Self {
            doc_type: Some(doc_type),
            topic: None,
        }
    }

    pub fn topic(topic: impl Into<String>) -> Self {
        Self {
            doc_type: None,
            topic: Some(topic.into()),
        }
    }

    fn matches(&self, doc: &Document) -> bool {
        self.doc_type.map_or(true, |t| doc.doc_type() == t)
            && self
                .topic
                .as_deref()
                .map_or(true, |topic| doc.metadata.topic == topic)
    }
}

pub struct HybridRetriever {
    embedder: Arc<dyn IEmbeddingProvider>,
    config: RetrievalConfig,
    snapshot: RwLock<Arc<CorpusSnapshot>>,
    /// Serialises writers so two batches never rebuild from the same base.
    writer: Mutex<()>,
}

impl HybridRetriever {
    pub fn new(embedder: Arc<dyn IEmbeddingProvider>, config: RetrievalConfig) -> Self {
        let snapshot = Arc::new(CorpusSnapshot::empty(&config, 0));
        Self {
            embedder,
            config,
            snapshot: RwLock::new(snapshot),
            writer: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// The current corpus generation.
    pub fn snapshot(&self) -> MathwiseResult<Arc<CorpusSnapshot>> {
        let guard = self
            .snapshot
            .read()
            .map_err(|_| MathwiseError::ConcurrencyError("corpus snapshot lock poisoned".into()))?;
        Ok(Arc::clone(&guard))
    }

    /// Snapshot for a read path. A poisoned lock fails closed to "no corpus".
    fn read_snapshot(&self) -> Option<Arc<CorpusSnapshot>> {
        match self.snapshot() {
            Ok(s) if !s.is_empty() => Some(s),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "retrieval unavailable");
                None
            }
        }
    }

    fn swap(&self, next: CorpusSnapshot) -> MathwiseResult<()> {
        let mut guard = self
            .snapshot
            .write()
            .map_err(|_| MathwiseError::ConcurrencyError("corpus snapshot lock poisoned".into()))?;
        *guard = Arc::new(next);
        Ok(())
    }

    fn embed_query(&self, query: &str) -> Option<Vec<f32>> {
        match self.embedder.embed(query) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(error = %e, "query embedding failed, dense ranking skipped");
                None
            }
        }
    }

    fn dense_hits(&self, snapshot: &CorpusSnapshot, query: &str, n: usize) -> Vec<RankedHit> {
        self.embed_query(query)
            .map(|v| snapshot.dense.query(&v, n))
            .unwrap_or_default()
    }

    fn materialize(snapshot: &CorpusSnapshot, candidate: FusedCandidate) -> Option<RetrievalResult> {
        let document = snapshot.documents.get(candidate.position)?.clone();
        Some(RetrievalResult {
            document,
            dense_rank: candidate.dense_rank,
            sparse_rank: candidate.sparse_rank,
            dense_score: candidate.dense_score.map(|d| 1.0 - d),
            sparse_score: candidate.sparse_score,
            fused_score: candidate.fused_score,
        })
    }

    fn fused(
        &self,
        snapshot: &CorpusSnapshot,
        query: &str,
        per_list: usize,
        limit: usize,
        weights: FusionWeights,
    ) -> Vec<RetrievalResult> {
        let dense = self.dense_hits(snapshot, query, per_list);
        let sparse = snapshot.sparse.search(query, per_list);
        debug!(
            dense = dense.len(),
            sparse = sparse.len(),
            "ranked lists ready for fusion"
        );
        fuse(&dense, &sparse, weights, self.config.rrf_k, limit)
            .into_iter()
            .filter_map(|c| Self::materialize(snapshot, c))
            .collect()
    }

    /// Dense-only search. `fused_score` is the cosine similarity floored at 0.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<RetrievalResult> {
        let Some(snapshot) = self.read_snapshot() else {
            return Vec::new();
        };
        let results: Vec<RetrievalResult> = self
            .dense_hits(&snapshot, query, top_k)
            .into_iter()
            .enumerate()
            .filter_map(|(i, hit)| {
                let similarity = 1.0 - hit.score;
                Self::materialize(
                    &snapshot,
                    FusedCandidate {
                        position: hit.position,
                        dense_rank: Some(i + 1),
                        sparse_rank: None,
                        dense_score: Some(hit.score),
                        sparse_score: None,
                        fused_score: similarity.max(0.0),
                    },
                )
            })
            .collect();
        completed("dense", &results);
        results
    }

    /// Weighted RRF over dense and sparse rankings. Each list contributes
    /// `candidate_multiplier * top_k` hits before fusion.
    pub fn hybrid_search(
        &self,
        query: &str,
        top_k: usize,
        dense_weight: f64,
        sparse_weight: f64,
    ) -> Vec<RetrievalResult> {
        let Some(snapshot) = self.read_snapshot() else {
            return Vec::new();
        };
        let per_list = top_k.saturating_mul(self.config.candidate_multiplier);
        let results = self.fused(
            &snapshot,
            query,
            per_list,
            top_k,
            FusionWeights::new(dense_weight, sparse_weight),
        );
        completed("hybrid", &results);
        results
    }

    /// Hybrid search over `overfetch_factor * top_k` candidates followed by
    /// diversity selection.
    pub fn search_diverse(
        &self,
        query: &str,
        top_k: usize,
        dense_weight: f64,
        sparse_weight: f64,
    ) -> Vec<RetrievalResult> {
        let Some(snapshot) = self.read_snapshot() else {
            return Vec::new();
        };
        let pool = top_k.saturating_mul(self.config.overfetch_factor);
        let per_list = pool.saturating_mul(self.config.candidate_multiplier);
        let candidates = self.fused(
            &snapshot,
            query,
            per_list,
            pool,
            FusionWeights::new(dense_weight, sparse_weight),
        );
        let results = select_diverse(candidates, top_k);
        completed("diverse", &results);
        results
    }

    /// Dense search restricted to documents matching `filter`.
    pub fn search_with_filter(
        &self,
        query: &str,
        top_k: usize,
        filter: &SearchFilter,
    ) -> Vec<RetrievalResult> {
        let Some(snapshot) = self.read_snapshot() else {
            return Vec::new();
        };
        let results: Vec<RetrievalResult> = self
            .dense_hits(&snapshot, query, snapshot.len())
            .into_iter()
            .filter(|hit| {
                snapshot
                    .documents
                    .get(hit.position)
                    .is_some_and(|doc| filter.matches(doc))
            })
            .take(top_k)
            .enumerate()
            .filter_map(|(i, hit)| {
                Self::materialize(
                    &snapshot,
                    FusedCandidate {
                        position: hit.position,
                        dense_rank: Some(i + 1),
                        sparse_rank: None,
                        dense_score: Some(hit.score),
                        sparse_score: None,
                        fused_score: (1.0 - hit.score).max(0.0),
                    },
                )
            })
            .collect();
        completed("filtered", &results);
        results
    }

    /// Add a batch and publish a new corpus generation.
    ///
    /// Ids must be unique within the batch and against the corpus; any clash
    /// rejects the whole batch and leaves the corpus untouched. The sparse
    /// index is rebuilt over the full corpus.
    pub fn add_documents(&self, documents: Vec<Document>) -> MathwiseResult<()> {
        if documents.is_empty() {
            return Ok(());
        }
        let _writer = self
            .writer
            .lock()
            .map_err(|_| MathwiseError::ConcurrencyError("corpus writer lock poisoned".into()))?;
        let current = self.snapshot()?;

        let mut ids = current.ids.clone();
        for doc in &documents {
            if !ids.insert(doc.id.clone()) {
                return Err(RetrievalError::DuplicateDocument { id: doc.id.clone() }.into());
            }
        }

        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;
        if embeddings.len() != documents.len() {
            return Err(RetrievalError::EmbeddingCountMismatch {
                documents: documents.len(),
                embeddings: embeddings.len(),
            }
            .into());
        }

        let added = documents.len();
        let mut all_docs = current.documents.clone();
        all_docs.extend(documents);
        let mut vectors = current.dense.vectors().to_vec();
        vectors.extend(embeddings);

        let all_texts: Vec<&str> = all_docs.iter().map(|d| d.text.as_str()).collect();
        let sparse = Bm25Index::build(&all_texts, self.config.bm25_k1, self.config.bm25_b);

        let next = CorpusSnapshot {
            documents: all_docs,
            ids,
            dense: DenseIndex::new(vectors),
            sparse,
            generation: current.generation + 1,
        };
        let (total, generation) = (next.len(), next.generation);
        self.swap(next)?;

        events::documents_indexed(added, total, generation);
        Ok(())
    }

    pub fn document_count(&self) -> usize {
        self.snapshot().map(|s| s.len()).unwrap_or(0)
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().map(|s| s.generation).unwrap_or(0)
    }

    /// Drop every document. Publishes an empty generation.
    pub fn clear(&self) -> MathwiseResult<()> {
        let _writer = self
            .writer
            .lock()
            .map_err(|_| MathwiseError::ConcurrencyError("corpus writer lock poisoned".into()))?;
        let generation = self.snapshot()?.generation + 1;
        self.swap(CorpusSnapshot::empty(&self.config, generation))?;
        info!(generation, "corpus cleared");
        Ok(())
    }
}

fn completed(method: &str, results: &[RetrievalResult]) {
    let top = results.first().map(|r| r.fused_score).unwrap_or(0.0);
    events::retrieval_completed(method, results.len(), top);
}

impl IRetriever for HybridRetriever {
    fn search(&self, query: &str, top_k: usize) -> Vec<RetrievalResult> {
        HybridRetriever::search(self, query, top_k)
    }

    fn hybrid_search(
        &self,
        query: &str,
        top_k: usize,
        dense_weight: f64,
        sparse_weight: f64,
    ) -> Vec<RetrievalResult> {
        HybridRetriever::hybrid_search(self, query, top_k, dense_weight, sparse_weight)
    }

    fn search_diverse(
        &self,
        query: &str,
        top_k: usize,
        dense_weight: f64,
        sparse_weight: f64,
    ) -> Vec<RetrievalResult> {
        HybridRetriever::search_diverse(self, query, top_k, dense_weight, sparse_weight)
    }

    fn add_documents(&self, documents: Vec<Document>) -> MathwiseResult<()> {
        HybridRetriever::add_documents(self, documents)
    }

    fn document_count(&self) -> usize {
        HybridRetriever::document_count(self)
    }
}
