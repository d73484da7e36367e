//! Configuration with layered resolution.
//!
//! Resolution order (highest priority first):
//! 1. Environment variables (`MATHWISE_*`)
//! 2. TOML file
//! 3. Compiled defaults (`defaults`)

pub mod defaults;
pub mod embedding_config;
pub mod observability_config;
pub mod pipeline_config;
pub mod retrieval_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use embedding_config::EmbeddingConfig;
pub use observability_config::ObservabilityConfig;
pub use pipeline_config::PipelineConfig;
pub use retrieval_config::RetrievalConfig;

use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MathwiseConfig {
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingConfig,
    pub pipeline: PipelineConfig,
    pub observability: ObservabilityConfig,
}

impl MathwiseConfig {
    /// Load configuration from a TOML string. Missing keys keep their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` (if it exists), apply `MATHWISE_*` overrides, validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `MATHWISE_*` variables from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup (the process environment
    /// in production, a map in tests).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("MATHWISE_TOP_K") {
            self.retrieval.top_k = parse_var("MATHWISE_TOP_K", &val)?;
        }
        if let Some(val) = lookup("MATHWISE_DENSE_WEIGHT") {
            self.retrieval.dense_weight = parse_var("MATHWISE_DENSE_WEIGHT", &val)?;
        }
        if let Some(val) = lookup("MATHWISE_SPARSE_WEIGHT") {
            self.retrieval.sparse_weight = parse_var("MATHWISE_SPARSE_WEIGHT", &val)?;
        }
        if let Some(val) = lookup("MATHWISE_KNOWLEDGE_BASE_PATH") {
            self.retrieval.knowledge_base_path = val;
        }
        if let Some(val) = lookup("MATHWISE_EMBEDDING_PROVIDER") {
            self.embedding.provider = val;
        }
        if let Some(val) = lookup("MATHWISE_CONFIDENCE_THRESHOLD") {
            self.pipeline.confidence_threshold =
                parse_var("MATHWISE_CONFIDENCE_THRESHOLD", &val)?;
        }
        if let Some(val) = lookup("MATHWISE_HITL_ENABLED") {
            self.pipeline.hitl_enabled = parse_bool(&val);
        }
        if let Some(val) = lookup("MATHWISE_COLLABORATOR_TIMEOUT_MS") {
            self.pipeline.collaborator_timeout_ms =
                parse_var("MATHWISE_COLLABORATOR_TIMEOUT_MS", &val)?;
        }
        Ok(())
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.retrieval;
        if r.top_k == 0 {
            return Err(invalid("retrieval.top_k", "must be greater than 0"));
        }
        if r.solve_top_k == 0 {
            return Err(invalid("retrieval.solve_top_k", "must be greater than 0"));
        }
        if r.overfetch_factor == 0 {
            return Err(invalid("retrieval.overfetch_factor", "must be greater than 0"));
        }
        if r.candidate_multiplier == 0 {
            return Err(invalid(
                "retrieval.candidate_multiplier",
                "must be greater than 0",
            ));
        }
        if r.dense_weight.is_nan() || r.dense_weight < 0.0 {
            return Err(invalid("retrieval.dense_weight", "must be non-negative"));
        }
        if r.sparse_weight.is_nan() || r.sparse_weight < 0.0 {
            return Err(invalid("retrieval.sparse_weight", "must be non-negative"));
        }
        if r.bm25_k1.is_nan() || r.bm25_k1 < 0.0 {
            return Err(invalid("retrieval.bm25_k1", "must be non-negative"));
        }
        if !(0.0..=1.0).contains(&r.bm25_b) {
            return Err(invalid("retrieval.bm25_b", "must be between 0.0 and 1.0"));
        }
        if self.embedding.dimensions == 0 {
            return Err(invalid("embedding.dimensions", "must be greater than 0"));
        }
        let p = &self.pipeline;
        if !(0.0..=1.0).contains(&p.confidence_threshold) {
            return Err(invalid(
                "pipeline.confidence_threshold",
                "must be between 0.0 and 1.0",
            ));
        }
        if p.collaborator_timeout_ms == 0 {
            return Err(invalid(
                "pipeline.collaborator_timeout_ms",
                "must be greater than 0",
            ));
        }
        if p.max_steps == 0 {
            return Err(invalid("pipeline.max_steps", "must be greater than 0"));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
