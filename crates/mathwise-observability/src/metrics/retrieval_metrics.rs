//! Query counts, empty results, mean best fused score.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalMetrics {
    pub queries: u64,
    /// Queries that returned nothing.
    pub empty_results: u64,
    /// Sum of the best fused score per non-empty query.
    pub total_top_score: f64,
}

impl RetrievalMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one query given the best fused score it produced, if any.
    pub fn record_query(&mut self, top_score: Option<f64>) {
        self.queries += 1;
        match top_score {
            Some(score) => self.total_top_score += score,
            None => self.empty_results += 1,
        }
    }

    /// Fraction of queries that returned at least one result.
    pub fn hit_rate(&self) -> f64 {
        if self.queries == 0 {
            return 0.0;
        }
        (self.queries - self.empty_results) as f64 / self.queries as f64
    }

    pub fn mean_top_score(&self) -> f64 {
        let hits = self.queries - self.empty_results;
        if hits == 0 {
            return 0.0;
        }
        self.total_top_score / hits as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_queries_do_not_skew_mean() {
        let mut m = RetrievalMetrics::new();
        m.record_query(Some(0.02));
        m.record_query(None);
        m.record_query(Some(0.04));

        assert_eq!(m.queries, 3);
        assert_eq!(m.empty_results, 1);
        assert!((m.mean_top_score() - 0.03).abs() < 1e-12);
        assert!((m.hit_rate() - 2.0 / 3.0).abs() < 1e-12);
    }
}
