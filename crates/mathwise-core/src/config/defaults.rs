// Single source of truth for all default values.

// --- Retrieval ---
pub const DEFAULT_RRF_K: u32 = 60;
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_DENSE_WEIGHT: f64 = 0.7;
pub const DEFAULT_SPARSE_WEIGHT: f64 = 0.3;
pub const DEFAULT_OVERFETCH_FACTOR: usize = 3;
pub const DEFAULT_CANDIDATE_MULTIPLIER: usize = 2;
pub const DEFAULT_SOLVE_TOP_K: usize = 6;
pub const DEFAULT_BM25_K1: f64 = 1.5;
pub const DEFAULT_BM25_B: f64 = 0.75;
pub const DEFAULT_KNOWLEDGE_BASE_PATH: &str = "./knowledge_base";

// --- Embeddings ---
pub const DEFAULT_EMBEDDING_PROVIDER: &str = "hashing";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;
pub const DEFAULT_L1_CACHE_SIZE: u64 = 10_000;

// --- Pipeline ---
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.6;
pub const DEFAULT_HITL_ENABLED: bool = true;
pub const DEFAULT_COLLABORATOR_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_STEPS: usize = 25;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
