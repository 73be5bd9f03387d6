//! Ingestion pipeline: embed text segments and append them to a store.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::chunker::{chunk_text, ChunkConfig};
use crate::config::IngestConfig;
use crate::debug_log;
use crate::embedder::{embedder_for_model, Embedder, EmbeddingError};
use crate::metadata::{DocumentMetadata, SectionMetadata};
use crate::store::{FlatVectorStore, StoreError, VectorStore, INDEX_FILE_NAME, META_FILE_NAME};

/// Errors surfaced by an ingestion call.
#[derive(Debug)]
pub enum IngestError {
    /// The store directory could not be created.
    DirectoryCreation {
        /// Directory the pipeline tried to create.
        path: PathBuf,
        /// Underlying filesystem error.
        source: io::Error,
    },
    /// The embedder failed to vectorize the input.
    Embedding(EmbeddingError),
    /// The store rejected or failed to persist the append.
    Store(StoreError),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectoryCreation { path, source } => {
                write!(f, "failed to create store directory {path:?}: {source}")
            }
            Self::Embedding(err) => write!(f, "embedding failed: {err}"),
            Self::Store(err) => write!(f, "store append failed: {err}"),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DirectoryCreation { source, .. } => Some(source),
            Self::Embedding(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<EmbeddingError> for IngestError {
    fn from(err: EmbeddingError) -> Self {
        Self::Embedding(err)
    }
}

impl From<StoreError> for IngestError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// One extracted document queued for chunked ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    source: String,
    text: String,
}

impl ExtractedDocument {
    /// Builds a document from its source tag and full text.
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }

    /// Source tag recorded in the metadata of every chunk.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Full document text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Composes an embedder and a vector store into one ingestion step.
///
/// The collaborators stay behind their traits so alternative embedding
/// backends or index implementations drop in without touching the pipeline.
pub struct IngestPipeline<'a> {
    embedder: &'a dyn Embedder,
}

impl<'a> IngestPipeline<'a> {
    /// Builds a pipeline around the given embedder.
    pub fn new(embedder: &'a dyn Embedder) -> Self {
        Self { embedder }
    }

    /// Embeds note sections and appends them with notes metadata.
    ///
    /// `chunk_index` is the section's position within this call's input, not
    /// its cumulative position in the store. Returns the number of appended
    /// entries.
    pub fn ingest_sections(
        &self,
        store: &mut dyn VectorStore,
        sections: &[impl AsRef<str>],
    ) -> Result<usize, IngestError> {
        let texts: Vec<&str> = sections.iter().map(|s| s.as_ref()).collect();
        let metadata = texts
            .iter()
            .enumerate()
            .map(|(i, text)| SectionMetadata::for_note(i, *text))
            .collect::<Vec<_>>();
        self.append_records(store, &texts, to_values(&metadata)?)
    }

    /// Chunks each document and appends every chunk with document metadata.
    ///
    /// Chunk indices restart at zero for each document. Documents whose text
    /// normalizes to nothing contribute no entries.
    pub fn ingest_documents(
        &self,
        store: &mut dyn VectorStore,
        docs: &[ExtractedDocument],
        chunking: &ChunkConfig,
    ) -> Result<usize, IngestError> {
        let mut chunks = Vec::new();
        let mut metadata = Vec::new();
        for doc in docs {
            for (i, chunk) in chunk_text(doc.text(), chunking).into_iter().enumerate() {
                metadata.push(DocumentMetadata::new(doc.source(), i, chunk.as_str()));
                chunks.push(chunk);
            }
        }
        let texts: Vec<&str> = chunks.iter().map(String::as_str).collect();
        self.append_records(store, &texts, to_values(&metadata)?)
    }

    fn append_records(
        &self,
        store: &mut dyn VectorStore,
        texts: &[&str],
        metadata: Vec<serde_json::Value>,
    ) -> Result<usize, IngestError> {
        if texts.is_empty() {
            return Ok(0);
        }

        let vectors = self.embedder.embed_batch(texts)?;
        if vectors.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: vectors.len(),
            }
            .into());
        }

        let appended = vectors.len();
        store.append(vectors, metadata)?;
        debug_log!(
            "appended {} entries; store now holds {}",
            appended,
            store.len()
        );
        Ok(appended)
    }
}

/// Ingests note sections into the configured store and returns its location.
///
/// Creates the store directory (idempotently), resolves the embedder from the
/// configured model identifier, and appends one (vector, metadata) pair per
/// section in input order. Empty input is legal: the directory is still
/// created and the store is left untouched.
pub fn ingest_notes_sections(
    sections: &[impl AsRef<str>],
    config: &IngestConfig,
) -> Result<PathBuf, IngestError> {
    let mut store = open_store(config)?;
    let embedder = embedder_for_model(config.model_identifier())?;
    IngestPipeline::new(embedder.as_ref()).ingest_sections(&mut store, sections)?;
    Ok(config.store_location().to_path_buf())
}

/// Ingests extracted documents, chunking each per the configured knobs, and
/// returns the store location.
pub fn ingest_documents(
    docs: &[ExtractedDocument],
    config: &IngestConfig,
) -> Result<PathBuf, IngestError> {
    let mut store = open_store(config)?;
    let embedder = embedder_for_model(config.model_identifier())?;
    IngestPipeline::new(embedder.as_ref()).ingest_documents(&mut store, docs, config.chunking())?;
    Ok(config.store_location().to_path_buf())
}

fn open_store(config: &IngestConfig) -> Result<FlatVectorStore, IngestError> {
    let location = config.store_location();
    fs::create_dir_all(location).map_err(|source| IngestError::DirectoryCreation {
        path: location.to_path_buf(),
        source,
    })?;
    let store = FlatVectorStore::open(
        location.join(INDEX_FILE_NAME),
        location.join(META_FILE_NAME),
    )?;
    Ok(store)
}

fn to_values<T: serde::Serialize>(records: &[T]) -> Result<Vec<serde_json::Value>, IngestError> {
    records
        .iter()
        .map(|record| {
            serde_json::to_value(record).map_err(|err| {
                IngestError::Store(StoreError::Write(io::Error::other(err)))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::NOTES_SOURCE;
    use serde_json::json;
    use std::path::Path;

    fn config_in(dir: &Path, model: &str) -> IngestConfig {
        IngestConfig::new(dir.join("store"), model)
    }

    fn reopen(config: &IngestConfig) -> FlatVectorStore {
        FlatVectorStore::open(
            config.store_location().join(INDEX_FILE_NAME),
            config.store_location().join(META_FILE_NAME),
        )
        .expect("reopen store")
    }

    #[test]
    fn ingests_one_entry_per_section_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_in(dir.path(), "hash-32");
        let sections = ["Buy milk", "Call Alice"];

        let location = ingest_notes_sections(&sections, &config).expect("ingest");
        assert_eq!(location, config.store_location());

        let store = reopen(&config);
        assert_eq!(store.len(), 2);
        assert_eq!(store.dimension(), Some(32));
        assert_eq!(
            store.metadata()[0],
            json!({"source": "notes", "chunk_index": 0, "text": "Buy milk"})
        );
        assert_eq!(
            store.metadata()[1],
            json!({"source": "notes", "chunk_index": 1, "text": "Call Alice"})
        );
    }

    #[test]
    fn stored_vectors_match_direct_embedding() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_in(dir.path(), "hash-16");
        let sections = ["first section", "second section"];
        ingest_notes_sections(&sections, &config).expect("ingest");

        let embedder = embedder_for_model("hash-16").expect("embedder");
        let expected = embedder
            .embed_batch(&["first section", "second section"])
            .expect("embed");
        let store = reopen(&config);
        assert_eq!(store.vectors(), expected.as_slice());
    }

    #[test]
    fn repeated_calls_append_rather_than_overwrite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_in(dir.path(), "hash-16");

        ingest_notes_sections(&["a", "b", "c"], &config).expect("first call");
        ingest_notes_sections(&["d", "e"], &config).expect("second call");

        let store = reopen(&config);
        assert_eq!(store.len(), 5);
        // chunk_index restarts per call; record order still disambiguates.
        assert_eq!(store.metadata()[3]["chunk_index"], json!(0));
        assert_eq!(store.metadata()[3]["text"], json!("d"));
    }

    #[test]
    fn directory_creation_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_in(dir.path(), "hash-8");
        ingest_notes_sections(&["x"], &config).expect("first call");
        ingest_notes_sections(&["y"], &config).expect("second call on existing dir");
    }

    #[test]
    fn empty_input_creates_directory_but_no_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_in(dir.path(), "hash-8");
        let sections: [&str; 0] = [];

        let location = ingest_notes_sections(&sections, &config).expect("empty ingest");
        assert!(location.is_dir());
        assert!(!location.join(INDEX_FILE_NAME).exists());
        assert_eq!(reopen(&config).len(), 0);
    }

    #[test]
    fn dimension_change_fails_and_leaves_store_intact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let narrow = config_in(dir.path(), "hash-16");
        ingest_notes_sections(&["seed"], &narrow).expect("seed ingest");

        let wide = config_in(dir.path(), "hash-32");
        let err = ingest_notes_sections(&["clash"], &wide).expect_err("dimension clash");
        assert!(matches!(
            err,
            IngestError::Store(StoreError::DimensionMismatch {
                expected: 16,
                actual: 32
            })
        ));

        let store = reopen(&narrow);
        assert_eq!(store.len(), 1);
        assert_eq!(store.dimension(), Some(16));
    }

    #[test]
    fn unsupported_model_surfaces_embedding_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config_in(dir.path(), "no-such-model");
        let err = ingest_notes_sections(&["x"], &config).expect_err("unsupported model");
        assert!(matches!(
            err,
            IngestError::Embedding(EmbeddingError::UnsupportedModel(_))
        ));
    }

    #[test]
    fn path_collision_with_file_reports_directory_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("store");
        std::fs::write(&blocker, b"not a directory").expect("write blocker");

        let config = IngestConfig::new(&blocker, "hash-8");
        let err = ingest_notes_sections(&["x"], &config).expect_err("collision");
        match err {
            IngestError::DirectoryCreation { path, .. } => assert_eq!(path, blocker),
            other => panic!("expected directory error, got {other:?}"),
        }
    }

    #[test]
    fn documents_are_chunked_with_per_document_indices() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config =
            config_in(dir.path(), "hash-16").with_chunking(ChunkConfig::new(10, 2));
        let docs = [
            ExtractedDocument::new("lecture.pdf", "abcdefghijklmnop"),
            ExtractedDocument::new("talk.mp4", "short"),
            ExtractedDocument::new("blank.txt", "   "),
        ];

        ingest_documents(&docs, &config).expect("ingest docs");

        let store = reopen(&config);
        assert_eq!(store.len(), 3);
        assert_eq!(store.metadata()[0]["source"], json!("lecture.pdf"));
        assert_eq!(store.metadata()[0]["chunk_index"], json!(0));
        assert_eq!(store.metadata()[1]["source"], json!("lecture.pdf"));
        assert_eq!(store.metadata()[1]["chunk_index"], json!(1));
        // Second document restarts its chunk numbering.
        assert_eq!(store.metadata()[2]["source"], json!("talk.mp4"));
        assert_eq!(store.metadata()[2]["chunk_index"], json!(0));
        assert_eq!(store.metadata()[2]["char_count"], json!(5));
    }

    #[test]
    fn pipeline_accepts_injected_collaborators() {
        struct FixedEmbedder;
        impl Embedder for FixedEmbedder {
            fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
                Ok(texts.iter().map(|_| vec![0.5, -0.5]).collect())
            }
            fn dimensions(&self) -> usize {
                2
            }
        }

        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FlatVectorStore::open(
            dir.path().join(INDEX_FILE_NAME),
            dir.path().join(META_FILE_NAME),
        )
        .expect("open store");

        let pipeline = IngestPipeline::new(&FixedEmbedder);
        let appended = pipeline
            .ingest_sections(&mut store, &["one", "two"])
            .expect("ingest");
        assert_eq!(appended, 2);
        assert_eq!(store.dimension(), Some(2));
        assert_eq!(store.metadata()[1]["source"], json!(NOTES_SOURCE));
    }

    #[test]
    fn miscounting_embedder_is_rejected() {
        struct ShortEmbedder;
        impl Embedder for ShortEmbedder {
            fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
                Ok(vec![vec![1.0]])
            }
            fn dimensions(&self) -> usize {
                1
            }
        }

        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FlatVectorStore::open(
            dir.path().join(INDEX_FILE_NAME),
            dir.path().join(META_FILE_NAME),
        )
        .expect("open store");

        let err = IngestPipeline::new(&ShortEmbedder)
            .ingest_sections(&mut store, &["one", "two"])
            .expect_err("count mismatch");
        assert!(matches!(
            err,
            IngestError::Embedding(EmbeddingError::CountMismatch {
                expected: 2,
                actual: 1
            })
        ));
        assert!(store.is_empty());
    }
}
