//! Ingestion configuration shared across pipeline entry points.

use std::path::{Path, PathBuf};

use crate::chunker::ChunkConfig;

/// Default directory for the notes vector store.
pub const DEFAULT_STORE_DIR: &str = "data/notes_index";

/// Default embedding model identifier (deterministic local family).
pub const DEFAULT_MODEL: &str = "hash-384";

/// Explicit pipeline configuration.
///
/// Replaces process-wide defaults: independent pipelines with different store
/// locations or models coexist by holding separate values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestConfig {
    store_location: PathBuf,
    model_identifier: String,
    chunking: ChunkConfig,
}

impl IngestConfig {
    /// Constructs a configuration for the given store directory and model.
    pub fn new(store_location: impl Into<PathBuf>, model_identifier: impl Into<String>) -> Self {
        Self {
            store_location: store_location.into(),
            model_identifier: model_identifier.into(),
            chunking: ChunkConfig::default(),
        }
    }

    /// Replaces the chunking configuration used by document ingestion.
    pub fn with_chunking(mut self, chunking: ChunkConfig) -> Self {
        self.chunking = chunking;
        self
    }

    /// Directory holding the index and metadata files.
    pub fn store_location(&self) -> &Path {
        &self.store_location
    }

    /// Embedding model identifier resolved at ingestion time.
    pub fn model_identifier(&self) -> &str {
        &self.model_identifier
    }

    /// Chunking knobs applied when ingesting whole documents.
    pub fn chunking(&self) -> &ChunkConfig {
        &self.chunking
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_DIR, DEFAULT_MODEL)
    }
}
