//! BM25 keyword ranking.
//!
//! Wraps the [`bm25`](https://crates.io/crates/bm25) search engine with the
//! math-aware tokenizer, so glyphs such as `√` and `²` are searchable terms.
//! The index is built whole from a document slice; a changed corpus means a
//! new index.

use std::fmt;

use bm25::{Document, SearchEngine, SearchEngineBuilder, Tokenizer};

use super::RankedHit;
use crate::tokenizer::tokenize;

/// Adapter exposing [`tokenize`] to the bm25 embedder.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathTokenizer;

impl Tokenizer for MathTokenizer {
    fn tokenize(&self, input_text: &str) -> Vec<String> {
        tokenize(input_text)
    }
}

type Engine = SearchEngine<usize, u32, MathTokenizer>;

pub struct Bm25Index {
    /// `None` for an empty corpus.
    engine: Option<Engine>,
    len: usize,
}

impl Bm25Index {
    /// Index `texts`, keyed by their position in the slice.
    pub fn build<S: AsRef<str>>(texts: &[S], k1: f64, b: f64) -> Self {
        if texts.is_empty() {
            return Self {
                engine: None,
                len: 0,
            };
        }
        let documents: Vec<Document<usize>> = texts
            .iter()
            .enumerate()
            .map(|(id, text)| Document {
                id,
                contents: text.as_ref().to_string(),
            })
            .collect();
        let engine =
            SearchEngineBuilder::<usize, u32, MathTokenizer>::with_tokenizer_and_documents(
                MathTokenizer,
                documents,
            )
            .k1(k1 as f32)
            .b(b as f32)
            .build();
        Self {
            engine: Some(engine),
            len: texts.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Top `k` documents with a positive score, descending. Ties keep
    /// insertion order.
    pub fn search(&self, query: &str, k: usize) -> Vec<RankedHit> {
        let Some(engine) = self.engine.as_ref() else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }
        // The engine orders ties arbitrarily, so rank every match here.
        let mut hits: Vec<RankedHit> = engine
            .search(query, self.len)
            .into_iter()
            .filter(|r| r.score > 0.0)
            .map(|r| RankedHit {
                position: r.document.id,
                score: f64::from(r.score),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.position.cmp(&b.position))
        });
        hits.truncate(k);
        hits
    }
}

impl fmt::Debug for Bm25Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bm25Index").field("len", &self.len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Bm25Index {
        Bm25Index::build(
            &[
                "Quadratic formula: x=(-b±√(b²-4ac))/2a",
                "Method: completing the square for a quadratic equation",
                "Example: solve x²-5x+6=0 → x=2,3",
                "Bayes theorem relates conditional probabilities",
            ],
            1.5,
            0.75,
        )
    }

    #[test]
    fn matching_documents_ranked_by_relevance() {
        let hits = corpus().search("quadratic equation", 10);
        assert_eq!(hits[0].position, 1, "both terms beat one term");
        assert!(hits.iter().any(|h| h.position == 0));
        assert!(hits.iter().all(|h| h.position != 3));
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn math_symbols_are_searchable() {
        let hits = corpus().search("√", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].position, 0);
    }

    #[test]
    fn tokenizer_adapter_matches_tokenize() {
        let text = "Solve x² + 2x = √9";
        assert_eq!(MathTokenizer.tokenize(text), tokenize(text));
    }

    #[test]
    fn no_match_and_empty_index_return_nothing() {
        assert!(corpus().search("eigenvalue", 10).is_empty());
        assert!(corpus().search("", 10).is_empty());
        let empty = Bm25Index::build::<&str>(&[], 1.5, 0.75);
        assert!(empty.is_empty());
        assert!(empty.search("quadratic", 10).is_empty());
    }

    #[test]
    fn term_in_every_document_still_scores_positive() {
        let idx = Bm25Index::build(&["x y", "x z"], 1.5, 0.75);
        let hits = idx.search("x", 10);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.score > 0.0));
        // Equal scores keep insertion order.
        assert_eq!(hits[0].position, 0);
        assert_eq!(hits[1].position, 1);
    }

    #[test]
    fn truncates_to_k() {
        let idx = Bm25Index::build(&["a", "a", "a"], 1.5, 0.75);
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.search("a", 2).len(), 2);
        assert_eq!(idx.search("a", 0).len(), 0);
    }
}
