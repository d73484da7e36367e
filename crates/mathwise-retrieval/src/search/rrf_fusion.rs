//! Weighted Reciprocal Rank Fusion:
//! `score = wd / (k0 + dense_rank) + ws / (k0 + sparse_rank)`.
//!
//! A document missing from one list gets no contribution from it. Weights
//! are used as given; they need not sum to one.

use std::collections::HashMap;

use tracing::warn;

use super::RankedHit;

/// Per-list fusion weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub dense: f64,
    pub sparse: f64,
}

impl FusionWeights {
    /// Negative or NaN weights are treated as zero so fused scores stay
    /// non-negative.
    pub fn new(dense: f64, sparse: f64) -> Self {
        Self {
            dense: sanitize(dense, "dense"),
            sparse: sanitize(sparse, "sparse"),
        }
    }
}

fn sanitize(weight: f64, list: &str) -> f64 {
    if weight.is_nan() || weight < 0.0 {
        warn!(list, weight, "invalid fusion weight, using 0");
        0.0
    } else {
        weight
    }
}

/// A document after fusion, addressed by snapshot position.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedCandidate {
    pub position: usize,
    /// 1-based.
    pub dense_rank: Option<usize>,
    /// 1-based.
    pub sparse_rank: Option<usize>,
    pub dense_score: Option<f64>,
    pub sparse_score: Option<f64>,
    pub fused_score: f64,
}

/// Fuse a dense and a sparse ranked list (each already in rank order).
///
/// The union is sorted by descending fused score and truncated to `limit`.
/// Ties are broken by first appearance in the dense list, then the sparse
/// list. Empty inputs give an empty output.
pub fn fuse(
    dense: &[RankedHit],
    sparse: &[RankedHit],
    weights: FusionWeights,
    k0: u32,
    limit: usize,
) -> Vec<FusedCandidate> {
    let k0 = k0 as f64;
    let mut slots: HashMap<usize, usize> = HashMap::new();
    let mut candidates: Vec<FusedCandidate> = Vec::with_capacity(dense.len() + sparse.len());

    for (i, hit) in dense.iter().enumerate() {
        let rank = i + 1;
        let slot = *slots.entry(hit.position).or_insert_with(|| {
            candidates.push(empty_candidate(hit.position));
            candidates.len() - 1
        });
        let c = &mut candidates[slot];
        // A position repeated within one list counts at its best rank only.
        if c.dense_rank.is_none() {
            c.dense_rank = Some(rank);
            c.dense_score = Some(hit.score);
            c.fused_score += weights.dense / (k0 + rank as f64);
        }
    }

    for (i, hit) in sparse.iter().enumerate() {
        let rank = i + 1;
        let slot = *slots.entry(hit.position).or_insert_with(|| {
            candidates.push(empty_candidate(hit.position));
            candidates.len() - 1
        });
        let c = &mut candidates[slot];
        if c.sparse_rank.is_none() {
            c.sparse_rank = Some(rank);
            c.sparse_score = Some(hit.score);
            c.fused_score += weights.sparse / (k0 + rank as f64);
        }
    }

    // Stable sort keeps first-appearance order among equal scores.
    candidates.sort_by(|a, b| b.fused_score.total_cmp(&a.fused_score));
    candidates.truncate(limit);
    candidates
}

fn empty_candidate(position: usize) -> FusedCandidate {
    FusedCandidate {
        position,
        dense_rank: None,
        sparse_rank: None,
        dense_score: None,
        sparse_score: None,
        fused_score: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(positions: &[usize]) -> Vec<RankedHit> {
        positions
            .iter()
            .map(|&position| RankedHit {
                position,
                score: 1.0,
            })
            .collect()
    }

    #[test]
    fn document_in_both_lists_sums_contributions() {
        let fused = fuse(&hits(&[7, 8]), &hits(&[8, 7]), FusionWeights::new(0.7, 0.3), 60, 10);
        let seven = fused.iter().find(|c| c.position == 7).unwrap();
        let expected = 0.7 / 61.0 + 0.3 / 62.0;
        assert!((seven.fused_score - expected).abs() < 1e-12);
        assert_eq!(seven.dense_rank, Some(1));
        assert_eq!(seven.sparse_rank, Some(2));
        assert_eq!(fused[0].position, 7);
    }

    #[test]
    fn absent_list_contributes_nothing() {
        let fused = fuse(&hits(&[1]), &hits(&[2]), FusionWeights::new(0.7, 0.3), 60, 10);
        let two = fused.iter().find(|c| c.position == 2).unwrap();
        assert_eq!(two.dense_rank, None);
        assert!((two.fused_score - 0.3 / 61.0).abs() < 1e-12);
    }

    #[test]
    fn ties_follow_dense_then_sparse_appearance() {
        // Equal weights: dense #1 and sparse #1 tie.
        let fused = fuse(&hits(&[4]), &hits(&[9]), FusionWeights::new(1.0, 1.0), 60, 10);
        let order: Vec<usize> = fused.iter().map(|c| c.position).collect();
        assert_eq!(order, vec![4, 9]);
    }

    #[test]
    fn unnormalized_weights_are_not_rescaled() {
        let fused = fuse(&hits(&[0]), &[], FusionWeights::new(2.0, 2.0), 60, 10);
        assert!((fused[0].fused_score - 2.0 / 61.0).abs() < 1e-12);
    }

    #[test]
    fn negative_weight_clamps_to_zero() {
        let w = FusionWeights::new(-1.0, f64::NAN);
        assert_eq!(w, FusionWeights { dense: 0.0, sparse: 0.0 });
    }

    #[test]
    fn empty_inputs_and_truncation() {
        assert!(fuse(&[], &[], FusionWeights::new(0.7, 0.3), 60, 5).is_empty());
        let fused = fuse(&hits(&[0, 1, 2]), &hits(&[3, 4]), FusionWeights::new(0.7, 0.3), 60, 2);
        assert_eq!(fused.len(), 2);
    }
}
