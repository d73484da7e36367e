//! Ranking primitives: dense and sparse indexes, fusion, diversity.
//!
//! Indexes address documents by their position in the owning snapshot.

pub mod dense;
pub mod diversity;
pub mod rrf_fusion;
pub mod sparse;

pub use dense::DenseIndex;
pub use diversity::select_diverse;
pub use rrf_fusion::{fuse, FusedCandidate, FusionWeights};
pub use sparse::Bm25Index;

/// One entry of a ranked list: document position and the list's own score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedHit {
    pub position: usize,
    pub score: f64,
}
