//! Deterministic feature-hashing embedder for offline ingestion and tests.

use super::{Embedder, EmbeddingError};

/// Local embedder that buckets whitespace tokens into a fixed-dimension
/// vector via a seeded 64-bit mixer, then L2-normalizes.
///
/// The model identifier seeds the mixer, so `hash-384` and a hypothetical
/// sibling model produce different vectors for the same text while each stays
/// deterministic on its own.
#[derive(Clone, Debug)]
pub struct HashEmbedder {
    seed: u64,
    dimensions: usize,
}

impl HashEmbedder {
    /// Builds an embedder for the given model identifier and dimensionality.
    pub fn new(model: &str, dimensions: usize) -> Self {
        Self {
            seed: mix_bytes(model.as_bytes(), MODEL_SEED),
            dimensions: dimensions.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text.split_whitespace() {
            let hash = mix_bytes(token.as_bytes(), self.seed);
            let bucket = (hash as usize) % self.dimensions;
            // Highest bit picks the sign so buckets can cancel as well as add.
            let sign = if hash & (1 << 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

impl Embedder for HashEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

const MODEL_SEED: u64 = 0x9e37_79b1_85eb_ca87;

fn mix_bytes(data: &[u8], seed: u64) -> u64 {
    let mut hash = seed ^ data.len() as u64;
    for &byte in data {
        hash ^= (byte as u64).wrapping_mul(0x1000_0000_01b3);
        hash = hash.rotate_left(13).wrapping_mul(0xff51_afd7_ed55_8ccd);
    }
    hash ^ (hash >> 33)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_matches_input_length_and_order() {
        let embedder = HashEmbedder::new("hash-16", 16);
        let vectors = embedder
            .embed_batch(&["alpha", "beta", "alpha"])
            .expect("embed");
        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[0], vectors[2]);
        assert_ne!(vectors[0], vectors[1]);
        for vector in &vectors {
            assert_eq!(vector.len(), 16);
        }
    }

    #[test]
    fn embeddings_are_deterministic_per_model() {
        let a = HashEmbedder::new("hash-32", 32);
        let b = HashEmbedder::new("hash-32", 32);
        let va = a.embed_batch(&["same text"]).expect("embed");
        let vb = b.embed_batch(&["same text"]).expect("embed");
        assert_eq!(va, vb);
    }

    #[test]
    fn different_model_identifiers_diverge() {
        let a = HashEmbedder::new("hash-32", 32);
        let b = HashEmbedder::new("hash-32-v2", 32);
        let va = a.embed_batch(&["same text"]).expect("embed");
        let vb = b.embed_batch(&["same text"]).expect("embed");
        assert_ne!(va, vb);
    }

    #[test]
    fn nonempty_text_is_unit_normalized() {
        let embedder = HashEmbedder::new("hash-8", 8);
        let vector = &embedder.embed_batch(&["some words here"]).expect("embed")[0];
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_text_embeds_to_zero_vector() {
        let embedder = HashEmbedder::new("hash-8", 8);
        let vector = &embedder.embed_batch(&[""]).expect("embed")[0];
        assert!(vector.iter().all(|v| *v == 0.0));
    }
}
