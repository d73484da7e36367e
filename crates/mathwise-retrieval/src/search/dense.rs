//! Exact cosine-distance nearest-neighbour index.

use super::RankedHit;

/// Brute-force cosine index. Vectors are stored by document position.
#[derive(Debug, Clone, Default)]
pub struct DenseIndex {
    vectors: Vec<Vec<f32>>,
    norms: Vec<f32>,
}

impl DenseIndex {
    pub fn new(vectors: Vec<Vec<f32>>) -> Self {
        let norms = vectors.iter().map(|v| l2_norm(v)).collect();
        Self { vectors, norms }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    /// The `k` nearest documents by ascending cosine distance (`1 - cos`).
    ///
    /// `RankedHit::score` holds the distance. Ties keep insertion order.
    /// An empty index, a zero or empty query, or a query of the wrong
    /// dimensionality yields no hits.
    pub fn query(&self, vector: &[f32], k: usize) -> Vec<RankedHit> {
        if self.is_empty() || vector.is_empty() || k == 0 {
            return Vec::new();
        }
        let query_norm = l2_norm(vector);
        if query_norm <= f32::EPSILON {
            return Vec::new();
        }

        let mut hits: Vec<RankedHit> = self
            .vectors
            .iter()
            .zip(&self.norms)
            .enumerate()
            .filter(|(_, (v, _))| v.len() == vector.len())
            .map(|(position, (v, &norm))| {
                let similarity = if norm <= f32::EPSILON {
                    0.0
                } else {
                    dot(v, vector) / (norm * query_norm)
                };
                RankedHit {
                    position,
                    score: (1.0 - similarity as f64).clamp(0.0, 2.0),
                }
            })
            .collect();

        hits.sort_by(|a, b| a.score.total_cmp(&b.score));
        hits.truncate(k);
        hits
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> DenseIndex {
        DenseIndex::new(vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.7, 0.7, 0.0],
        ])
    }

    #[test]
    fn nearest_first() {
        let hits = index().query(&[1.0, 0.1, 0.0], 3);
        let order: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(order, vec![0, 2, 1]);
        assert!(hits.windows(2).all(|w| w[0].score <= w[1].score));
    }

    #[test]
    fn exact_match_has_zero_distance() {
        let hits = index().query(&[0.0, 2.0, 0.0], 1);
        assert_eq!(hits[0].position, 1);
        assert!(hits[0].score.abs() < 1e-6);
    }

    #[test]
    fn fails_closed() {
        assert!(DenseIndex::default().query(&[1.0, 0.0], 5).is_empty());
        assert!(index().query(&[], 5).is_empty());
        assert!(index().query(&[0.0, 0.0, 0.0], 5).is_empty());
        assert!(index().query(&[1.0, 0.0], 5).is_empty());
        assert!(index().query(&[1.0, 0.0, 0.0], 0).is_empty());
    }

    #[test]
    fn ties_keep_insertion_order() {
        let idx = DenseIndex::new(vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![2.0, 0.0]]);
        let order: Vec<usize> = idx.query(&[1.0, 0.0], 3).iter().map(|h| h.position).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }
}
