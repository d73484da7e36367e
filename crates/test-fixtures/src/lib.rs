//! Test fixtures for mathwise: an on-disk sample knowledge base and
//! deterministic stand-ins for the language-model collaborators.

pub mod stubs;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

/// Root of the fixture data directory.
pub fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// The sample knowledge base (`formulas/`, `templates/`, `examples/`).
pub fn knowledge_base_path() -> PathBuf {
    fixtures_root().join("knowledge")
}

/// Absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixture_path(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}
