//! Embedding backends behind a narrow text-to-vector capability.

use std::fmt;

pub mod hash;
pub mod openai;

pub use hash::HashEmbedder;
pub use openai::OpenAiEmbedder;

/// Maps batches of text to fixed-dimension vectors.
///
/// Implementations must return exactly one vector per input, in input order,
/// and must be deterministic for a fixed model identifier and fixed text.
pub trait Embedder {
    /// Embeds each text in order; the result has the same length as `texts`.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Fixed output dimensionality of this embedder.
    fn dimensions(&self) -> usize;
}

/// Errors surfaced while producing embeddings.
#[derive(Debug)]
pub enum EmbeddingError {
    /// No embedder is available for the requested model identifier.
    UnsupportedModel(String),
    /// The backend returned a different number of vectors than inputs.
    CountMismatch {
        /// Number of input texts.
        expected: usize,
        /// Number of vectors the backend produced.
        actual: usize,
    },
    /// The backend failed to produce embeddings.
    Backend(anyhow::Error),
}

impl fmt::Display for EmbeddingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedModel(model) => {
                write!(f, "unsupported embedding model identifier {model:?}")
            }
            Self::CountMismatch { expected, actual } => {
                write!(f, "backend returned {actual} embeddings for {expected} inputs")
            }
            Self::Backend(err) => write!(f, "embedding backend failed: {err}"),
        }
    }
}

impl std::error::Error for EmbeddingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Resolves a model identifier to a local embedder.
///
/// Only the deterministic `hash-<dim>` family resolves here; remote backends
/// need credentials and are injected into the pipeline by the caller instead.
pub fn embedder_for_model(model: &str) -> Result<Box<dyn Embedder>, EmbeddingError> {
    if let Some(dim) = model
        .strip_prefix("hash-")
        .and_then(|suffix| suffix.parse::<usize>().ok())
        .filter(|dim| *dim > 0)
    {
        return Ok(Box::new(HashEmbedder::new(model, dim)));
    }
    Err(EmbeddingError::UnsupportedModel(model.to_string()))
}
