//! Text feature encoding for the query-understanding pipeline.
//!
//! This module provides a trait-based interface for converting query text to
//! fixed-length numeric feature vectors. The encoder is treated as a black
//! box by the rest of the pipeline: the only contract is that it is pure and
//! deterministic (same text always yields the same vector) and that every
//! vector has the declared dimension.

use std::fmt::Debug;

use crate::error::{PaideiaError, Result};
use crate::forest::FeatureVector;

/// Default embedding dimension.
pub const DEFAULT_DIMENSION: usize = 256;

/// Deterministic text-to-vector encoder.
///
/// Implementations must be `Send + Sync` so a trained bundle can be shared
/// across concurrent prediction requests.
pub trait TextEmbedder: Send + Sync + Debug {
    /// Encode text into a feature vector of exactly `dimension()` entries.
    fn embed(&self, text: &str) -> Result<FeatureVector>;

    /// Fixed output dimension of this embedder.
    fn dimension(&self) -> usize;

    /// Name of this embedder, for logging and bundle metadata.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Feature-hashing sentence encoder.
///
/// Hashes word unigrams and character trigrams into a signed fixed-length
/// vector and L2-normalizes the result. Requires no fitting and no model
/// files; identical text always produces an identical vector.
#[derive(Debug, Clone)]
pub struct HashingTextEmbedder {
    dimension: usize,
}

/// Relative weight of character trigram features against word features.
const TRIGRAM_WEIGHT: f64 = 0.5;

impl HashingTextEmbedder {
    /// Create an embedder with the default dimension.
    pub fn new() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
        }
    }

    /// Create an embedder with a custom dimension.
    pub fn with_dimension(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(PaideiaError::invalid_input(
                "embedding dimension must be greater than zero",
            ));
        }
        Ok(Self { dimension })
    }

    fn accumulate(&self, vector: &mut [f64], feature: &str, weight: f64) {
        let hash = fnv1a(feature.as_bytes());
        let idx = ((hash >> 1) % self.dimension as u64) as usize;
        let sign = if hash & 1 == 0 { 1.0 } else { -1.0 };
        vector[idx] += sign * weight;
    }
}

impl Default for HashingTextEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEmbedder for HashingTextEmbedder {
    fn embed(&self, text: &str) -> Result<FeatureVector> {
        let mut vector = vec![0.0; self.dimension];

        for token in crate::analysis::tokenize(text) {
            self.accumulate(&mut vector, &token, 1.0);

            let chars: Vec<char> = token.chars().collect();
            if chars.len() >= 3 {
                for window in chars.windows(3) {
                    let trigram: String = window.iter().collect();
                    self.accumulate(&mut vector, &trigram, TRIGRAM_WEIGHT);
                }
            }
        }

        let norm: f64 = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hashing-text"
    }
}

/// 64-bit FNV-1a. Stable across platforms and processes, which keeps
/// embeddings reproducible for the lifetime of a persisted bundle.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_is_deterministic() {
        let embedder = HashingTextEmbedder::new();
        let a = embedder.embed("what is gradient descent").unwrap();
        let b = embedder.embed("what is gradient descent").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_embedding_has_declared_dimension() {
        let embedder = HashingTextEmbedder::with_dimension(64).unwrap();
        let vector = embedder.embed("explain neural networks").unwrap();
        assert_eq!(vector.len(), 64);
        assert_eq!(embedder.dimension(), 64);
    }

    #[test]
    fn test_embedding_is_normalized() {
        let embedder = HashingTextEmbedder::new();
        let vector = embedder.embed("summary of transformers").unwrap();
        let norm: f64 = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_distinct_texts_produce_distinct_vectors() {
        let embedder = HashingTextEmbedder::new();
        let a = embedder.embed("give me an example of CNN").unwrap();
        let b = embedder.embed("revise reinforcement learning quickly").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_text_yields_zero_vector() {
        let embedder = HashingTextEmbedder::new();
        let vector = embedder.embed("").unwrap();
        assert!(vector.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(HashingTextEmbedder::with_dimension(0).is_err());
    }
}
