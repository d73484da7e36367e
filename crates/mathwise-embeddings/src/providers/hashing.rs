//! Hashed term-frequency embedder.
//!
//! Terms and character trigrams are hashed into fixed buckets with FNV-1a,
//! weighted, then L2-normalised. No model files, no network.

use std::collections::HashMap;

use mathwise_core::errors::MathwiseResult;
use mathwise_core::traits::IEmbeddingProvider;

/// Weight of character trigram features relative to whole terms.
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Deterministic embedding provider. Always available.
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn bucket(feature: &str, dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in feature.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h % dims as u64) as usize
    }

    /// Lower-cased alphanumeric runs. Single characters are kept since
    /// variable names (`x`, `n`) carry meaning in math text.
    fn terms(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect()
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return vec;
        }
        let terms = Self::terms(text);
        if terms.is_empty() {
            return vec;
        }

        let mut tf: HashMap<&str, f32> = HashMap::new();
        for term in &terms {
            *tf.entry(term.as_str()).or_default() += 1.0;
        }
        let total = terms.len() as f32;

        for (term, count) in &tf {
            let freq = count / total;
            // Pseudo-IDF: longer terms are rarer and more informative.
            let idf = 1.0 + (term.chars().count() as f32).ln();
            vec[Self::bucket(term, self.dimensions)] += freq * idf;

            let chars: Vec<char> = format!("#{term}#").chars().collect();
            for window in chars.windows(3) {
                let gram: String = window.iter().collect();
                let key = format!("3:{gram}");
                vec[Self::bucket(&key, self.dimensions)] += freq * TRIGRAM_WEIGHT;
            }
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

impl IEmbeddingProvider for HashingEmbedder {
    fn embed(&self, text: &str) -> MathwiseResult<Vec<f32>> {
        Ok(self.vector(text))
    }

    fn embed_batch(&self, texts: &[String]) -> MathwiseResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashing"
    }

    fn is_available(&self) -> bool {
        true
    }
}
