use std::collections::HashSet;
use std::sync::Arc;

use mathwise_core::config::RetrievalConfig;
use mathwise_core::models::{DocType, Document, DocumentMetadata};
use mathwise_embeddings::HashingEmbedder;
use mathwise_retrieval::search::{fuse, FusionWeights, RankedHit};
use mathwise_retrieval::HybridRetriever;
use proptest::prelude::*;

const VOCAB: &[&str] = &[
    "solve", "quadratic", "equation", "root", "derivative", "integral", "x²", "√", "∫",
    "probability", "matrix", "factor", "limit", "sum",
];
const LABELS: &[&str] = &["formula", "template_method", "example_solution", "note"];

fn corpus() -> impl Strategy<Value = Vec<(usize, Vec<usize>)>> {
    prop::collection::vec(
        (0..LABELS.len(), prop::collection::vec(0..VOCAB.len(), 1..8)),
        1..20,
    )
}

fn query() -> impl Strategy<Value = String> {
    prop::collection::vec(0..VOCAB.len(), 1..4)
        .prop_map(|words| words.iter().map(|&w| VOCAB[w]).collect::<Vec<_>>().join(" "))
}

fn build(docs: &[(usize, Vec<usize>)]) -> HybridRetriever {
    let retriever = HybridRetriever::new(
        Arc::new(HashingEmbedder::new(64)),
        RetrievalConfig::default(),
    );
    let documents = docs
        .iter()
        .enumerate()
        .map(|(i, (label, words))| {
            let text = words.iter().map(|&w| VOCAB[w]).collect::<Vec<_>>().join(" ");
            Document::new(
                format!("d{i}"),
                text,
                DocumentMetadata::new(LABELS[*label], "algebra", "prop"),
            )
        })
        .collect();
    retriever.add_documents(documents).unwrap();
    retriever
}

fn ranked(positions: &[usize]) -> Vec<RankedHit> {
    positions
        .iter()
        .map(|&position| RankedHit { position, score: 1.0 })
        .collect()
}

proptest! {
    #[test]
    fn hybrid_results_sorted_and_match_rrf(
        docs in corpus(),
        q in query(),
        k in 1usize..10,
        wd in 0.0f64..2.0,
        ws in 0.0f64..2.0,
    ) {
        let retriever = build(&docs);
        let results = retriever.hybrid_search(&q, k, wd, ws);

        prop_assert!(results.len() <= k);
        for pair in results.windows(2) {
            prop_assert!(pair[0].fused_score >= pair[1].fused_score);
        }
        let mut ids = HashSet::new();
        for r in &results {
            prop_assert!(ids.insert(r.document.id.clone()), "duplicate {}", r.document.id);
            prop_assert!(r.fused_score >= 0.0);
            let expected = r.dense_rank.map_or(0.0, |rank| wd / (60.0 + rank as f64))
                + r.sparse_rank.map_or(0.0, |rank| ws / (60.0 + rank as f64));
            prop_assert!((r.fused_score - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn diverse_results_seed_every_available_category(
        docs in corpus(),
        q in query(),
        k in 3usize..8,
    ) {
        let retriever = build(&docs);
        // Same candidate pool search_diverse draws from.
        let pool = retriever.hybrid_search(&q, 3 * k, 0.7, 0.3);
        let results = retriever.search_diverse(&q, k, 0.7, 0.3);

        prop_assert_eq!(results.len(), k.min(pool.len()));
        let ids: HashSet<_> = results.iter().map(|r| r.document.id.clone()).collect();
        prop_assert_eq!(ids.len(), results.len());

        let mut expected_seeds = Vec::new();
        for t in DocType::SEED_ORDER {
            if pool.iter().any(|r| r.document.doc_type() == t) {
                expected_seeds.push(t);
            }
        }
        let leading: Vec<DocType> = results
            .iter()
            .take(expected_seeds.len())
            .map(|r| r.document.doc_type())
            .collect();
        prop_assert_eq!(leading, expected_seeds);
    }

    #[test]
    fn fusion_is_a_pure_function_of_ranks(
        dense in prop::collection::vec(0usize..30, 0..15),
        sparse in prop::collection::vec(0usize..30, 0..15),
        wd in 0.0f64..1.0,
        ws in 0.0f64..1.0,
    ) {
        // Ranked lists never repeat a document.
        let mut seen = HashSet::new();
        let dense: Vec<usize> = dense.into_iter().filter(|p| seen.insert(*p)).collect();
        let mut seen = HashSet::new();
        let sparse: Vec<usize> = sparse.into_iter().filter(|p| seen.insert(*p)).collect();

        let weights = FusionWeights::new(wd, ws);
        let fused = fuse(&ranked(&dense), &ranked(&sparse), weights, 60, usize::MAX);
        let union: HashSet<usize> = dense.iter().chain(&sparse).copied().collect();
        prop_assert_eq!(fused.len(), union.len());

        for c in &fused {
            let dr = dense.iter().position(|&p| p == c.position).map(|i| i + 1);
            let sr = sparse.iter().position(|&p| p == c.position).map(|i| i + 1);
            prop_assert_eq!(c.dense_rank, dr);
            prop_assert_eq!(c.sparse_rank, sr);
        }
        for pair in fused.windows(2) {
            prop_assert!(pair[0].fused_score >= pair[1].fused_score);
        }
    }
}
