//! Category-aware selection over fused candidates.

use std::collections::HashSet;

use mathwise_core::models::{DocType, RetrievalResult};

/// Pick `k` results from `candidates` (sorted by descending fused score).
///
/// The best formula, template, and example are seeded first, in that order,
/// skipping empty buckets and stopping early when `k` is reached. Remaining
/// slots are filled in fused order. Fewer than `k` results come back only
/// when there are fewer distinct candidates.
pub fn select_diverse(candidates: Vec<RetrievalResult>, k: usize) -> Vec<RetrievalResult> {
    let mut taken = vec![false; candidates.len()];
    let mut seen: HashSet<&str> = HashSet::new();
    let mut order: Vec<usize> = Vec::with_capacity(k);

    for doc_type in DocType::SEED_ORDER {
        if order.len() >= k {
            break;
        }
        let best = candidates.iter().enumerate().find(|(i, c)| {
            !taken[*i] && c.document.doc_type() == doc_type && !seen.contains(c.id())
        });
        if let Some((i, c)) = best {
            taken[i] = true;
            seen.insert(c.id());
            order.push(i);
        }
    }

    for (i, c) in candidates.iter().enumerate() {
        if order.len() >= k {
            break;
        }
        if taken[i] || seen.contains(c.id()) {
            continue;
        }
        taken[i] = true;
        seen.insert(c.id());
        order.push(i);
    }

    let mut slots: Vec<Option<RetrievalResult>> = candidates.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}
