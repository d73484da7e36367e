//! Integration tests for HybridRetriever over the hashing embedder.

use std::sync::Arc;
use std::thread;

use mathwise_core::config::{EmbeddingConfig, RetrievalConfig};
use mathwise_core::errors::{MathwiseError, RetrievalError};
use mathwise_core::models::{DocType, Document, DocumentMetadata};
use mathwise_embeddings::EmbeddingEngine;
use mathwise_retrieval::{ingest_knowledge_base, HybridRetriever, SearchFilter};

fn retriever() -> HybridRetriever {
    let embedder = EmbeddingEngine::new(EmbeddingConfig {
        dimensions: 128,
        ..Default::default()
    });
    HybridRetriever::new(Arc::new(embedder), RetrievalConfig::default())
}

fn doc(id: &str, text: &str, label: &str) -> Document {
    Document::new(id, text, DocumentMetadata::new(label, "algebra", "test"))
}

fn quadratic_docs() -> Vec<Document> {
    vec![
        doc("f", "Quadratic formula: x=(-b±√(b²-4ac))/2a", "formula"),
        doc("t", "Method: completing the square...", "template"),
        doc("e", "Example: solve x²-5x+6=0 → x=2,3", "example"),
    ]
}

#[test]
fn diverse_search_returns_one_of_each_category() {
    let r = retriever();
    r.add_documents(quadratic_docs()).unwrap();

    let results = r.search_diverse("solve quadratic equation", 3, 0.7, 0.3);
    let types: Vec<DocType> = results.iter().map(|r| r.document.doc_type()).collect();
    assert_eq!(types, vec![DocType::Formula, DocType::Template, DocType::Example]);
}

#[test]
fn hybrid_scores_follow_weighted_rrf() {
    let r = retriever();
    r.add_documents(quadratic_docs()).unwrap();

    let results = r.hybrid_search("solve quadratic equation", 3, 0.7, 0.3);
    assert_eq!(results.len(), 3);
    for res in &results {
        let dense = res.dense_rank.map_or(0.0, |rank| 0.7 / (60.0 + rank as f64));
        let sparse = res.sparse_rank.map_or(0.0, |rank| 0.3 / (60.0 + rank as f64));
        assert!((res.fused_score - (dense + sparse)).abs() < 1e-12);
    }
    assert!(results
        .windows(2)
        .all(|w| w[0].fused_score >= w[1].fused_score));
}

#[test]
fn disjoint_batches_are_both_searchable() {
    let r = retriever();
    r.add_documents(vec![
        doc("alg-1", "quadratic equation roots by factoring", "template_method"),
        doc("alg-2", "linear equation isolate the variable", "template_method"),
    ])
    .unwrap();
    r.add_documents(vec![
        doc("prob-1", "bayes theorem conditional probability", "formula"),
        doc("prob-2", "binomial distribution probability of k successes", "formula"),
    ])
    .unwrap();

    assert_eq!(r.document_count(), 4);
    assert_eq!(r.generation(), 2);

    let first = r.hybrid_search("quadratic factoring", 2, 0.7, 0.3);
    assert_eq!(first[0].document.id, "alg-1");
    let second = r.hybrid_search("bayes conditional probability", 2, 0.7, 0.3);
    assert_eq!(second[0].document.id, "prob-1");
}

#[test]
fn duplicate_ids_reject_the_whole_batch() {
    let r = retriever();
    r.add_documents(quadratic_docs()).unwrap();

    let err = r
        .add_documents(vec![doc("new", "fresh document", "note"), doc("f", "clash", "formula")])
        .unwrap_err();
    assert!(matches!(
        err,
        MathwiseError::RetrievalError(RetrievalError::DuplicateDocument { ref id }) if id == "f"
    ));
    assert_eq!(r.document_count(), 3);
    assert_eq!(r.generation(), 1);

    let err = r
        .add_documents(vec![doc("x", "one", "note"), doc("x", "two", "note")])
        .unwrap_err();
    assert!(matches!(err, MathwiseError::RetrievalError(_)));
    assert_eq!(r.document_count(), 3);
}

#[test]
fn empty_corpus_fails_closed() {
    let r = retriever();
    assert!(r.search("anything", 5).is_empty());
    assert!(r.hybrid_search("anything", 5, 0.7, 0.3).is_empty());
    assert!(r.search_diverse("anything", 5, 0.7, 0.3).is_empty());
    assert!(r
        .search_with_filter("anything", 5, &SearchFilter::doc_type(DocType::Formula))
        .is_empty());
}

#[test]
fn dense_search_reports_similarity() {
    let r = retriever();
    r.add_documents(quadratic_docs()).unwrap();

    let results = r.search("quadratic formula", 3);
    assert!(!results.is_empty());
    assert_eq!(results[0].document.id, "f");
    for (i, res) in results.iter().enumerate() {
        assert_eq!(res.dense_rank, Some(i + 1));
        assert_eq!(res.sparse_rank, None);
        assert!(res.fused_score >= 0.0);
        let similarity = res.dense_score.unwrap();
        assert!((res.fused_score - similarity.max(0.0)).abs() < 1e-12);
    }
}

#[test]
fn filtered_search_respects_category_and_topic() {
    let r = retriever();
    r.add_documents(quadratic_docs()).unwrap();
    r.add_documents(vec![Document::new(
        "calc",
        "power rule derivative",
        DocumentMetadata::new("formula", "calculus", "test"),
    )])
    .unwrap();

    let formulas = r.search_with_filter("quadratic", 5, &SearchFilter::doc_type(DocType::Formula));
    assert_eq!(formulas.len(), 2);
    assert!(formulas.iter().all(|res| res.document.doc_type() == DocType::Formula));

    let calculus = r.search_with_filter("derivative", 5, &SearchFilter::topic("calculus"));
    assert_eq!(calculus.len(), 1);
    assert_eq!(calculus[0].document.id, "calc");
}

#[test]
fn clear_publishes_an_empty_generation() {
    let r = retriever();
    r.add_documents(quadratic_docs()).unwrap();
    r.clear().unwrap();
    assert_eq!(r.document_count(), 0);
    assert_eq!(r.generation(), 2);
    // Ids are free again after a clear.
    r.add_documents(quadratic_docs()).unwrap();
    assert_eq!(r.document_count(), 3);
}

#[test]
fn readers_never_observe_a_partial_batch() {
    let r = retriever();
    const BATCH: usize = 5;

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..50 {
                    let snapshot = r.snapshot().unwrap();
                    assert_eq!(snapshot.len() % BATCH, 0);
                    let results = r.hybrid_search("equation", 50, 0.7, 0.3);
                    assert_eq!(results.len() % BATCH, 0);
                }
            });
        }
        s.spawn(|| {
            for batch in 0..10 {
                let docs = (0..BATCH)
                    .map(|i| doc(&format!("b{batch}-{i}"), "equation with variable x", "note"))
                    .collect();
                r.add_documents(docs).unwrap();
            }
        });
    });

    assert_eq!(r.document_count(), 10 * BATCH);
    assert_eq!(r.generation(), 10);
}

#[test]
fn fixture_knowledge_base_covers_every_category() {
    let r = retriever();
    let report = ingest_knowledge_base(&r, &test_fixtures::knowledge_base_path()).unwrap();
    assert_eq!(report.formulas, 5);
    assert_eq!(report.templates, 4);
    assert_eq!(report.examples, 2);
    assert_eq!(r.document_count(), report.total());

    let results = r.search_diverse("solve quadratic equation", 4, 0.7, 0.3);
    assert_eq!(results.len(), 4);
    assert_eq!(results[0].document.doc_type(), DocType::Formula);
    assert_eq!(results[1].document.doc_type(), DocType::Template);
    assert_eq!(results[2].document.doc_type(), DocType::Example);
}

#[test]
fn disjoint_knowledge_directories_share_one_retriever() {
    let formulas = test_fixtures::knowledge_base_path().join("formulas");
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    for (dir, file) in [(&first, "algebra.json"), (&second, "calculus.json")] {
        std::fs::create_dir_all(dir.path().join("formulas")).unwrap();
        std::fs::copy(formulas.join(file), dir.path().join("formulas").join(file)).unwrap();
    }

    let r = retriever();
    let a = ingest_knowledge_base(&r, first.path()).unwrap();
    let b = ingest_knowledge_base(&r, second.path()).unwrap();
    assert!(a.formulas > 0 && b.formulas > 0);
    assert_eq!(r.document_count(), a.total() + b.total());
    assert_eq!(r.generation(), 2);

    let topics: Vec<String> = r
        .search_with_filter("derivative", 10, &SearchFilter::topic("calculus"))
        .into_iter()
        .map(|res| res.document.metadata.topic)
        .collect();
    assert!(!topics.is_empty());
    assert!(topics.iter().all(|t| t == "calculus"));

    // The same directory twice is still a duplicate.
    let err = ingest_knowledge_base(&r, first.path()).unwrap_err();
    assert!(matches!(
        err,
        MathwiseError::RetrievalError(RetrievalError::DuplicateDocument { .. })
    ));
    assert_eq!(r.document_count(), a.total() + b.total());
}
