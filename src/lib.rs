#![warn(missing_docs)]
//! Core library entry points for the noteindex ingestion pipeline.

pub mod chunker;
pub mod config;
pub mod embedder;
pub mod ingest;
pub mod metadata;
pub mod store;

pub use chunker::{chunk_text, ChunkConfig};
pub use config::{IngestConfig, DEFAULT_MODEL, DEFAULT_STORE_DIR};
pub use embedder::{embedder_for_model, Embedder, EmbeddingError, HashEmbedder, OpenAiEmbedder};
pub use ingest::{
    ingest_documents, ingest_notes_sections, ExtractedDocument, IngestError, IngestPipeline,
};
pub use metadata::{DocumentMetadata, SectionMetadata, NOTES_SOURCE};
pub use store::{FlatVectorStore, StoreError, VectorStore, INDEX_FILE_NAME, META_FILE_NAME};

#[cfg(feature = "debug_logs")]
#[macro_export]
// This allows use of the `eprintln!` macro via `debug_log!` macro.
macro_rules! debug_log {
        ($($arg:tt)*) => {
            eprintln!($($arg)*);
        };
    }
#[cfg(not(feature = "debug_logs"))]
#[macro_export]
// This effectively disables the `eprintln!` macro, effectively removing it from the code during
// compilation.
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}
