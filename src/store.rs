//! Flat on-disk vector store: an index file of raw vectors plus an
//! order-aligned JSON metadata file.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// File name of the vector index inside a store directory.
pub const INDEX_FILE_NAME: &str = "index.bin";
/// File name of the metadata records inside a store directory.
pub const META_FILE_NAME: &str = "meta.json";

const INDEX_MAGIC: &[u8; 8] = b"NOTEIDX1";

/// Errors surfaced by vector store operations.
#[derive(Debug)]
pub enum StoreError {
    /// `append` was called with differing vector and metadata counts.
    LengthMismatch {
        /// Number of vectors in the batch.
        vectors: usize,
        /// Number of metadata records in the batch.
        metadata: usize,
    },
    /// A vector's dimensionality differs from the store's existing dimension.
    DimensionMismatch {
        /// Dimension the store (or batch) is committed to.
        expected: usize,
        /// Dimension of the offending vector.
        actual: usize,
    },
    /// The persisted files could not be read back as a consistent store.
    Load(String),
    /// Persisting the index or metadata file failed.
    Write(io::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { vectors, metadata } => write!(
                f,
                "append requires matching counts, got {vectors} vectors and {metadata} metadata records"
            ),
            Self::DimensionMismatch { expected, actual } => write!(
                f,
                "vector dimension {actual} does not match store dimension {expected}"
            ),
            Self::Load(reason) => write!(f, "failed to load vector store: {reason}"),
            Self::Write(err) => write!(f, "failed to persist vector store: {err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Write(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        Self::Write(err)
    }
}

/// Persists (vector, metadata) pairs durably, preserving append order.
pub trait VectorStore {
    /// Appends the pairs in order and persists both files before returning.
    ///
    /// Requires `vectors.len() == metadata.len()`. Every vector must match
    /// the store's existing dimensionality when the store is non-empty; a
    /// rejected batch leaves the store unmodified.
    fn append(
        &mut self,
        vectors: Vec<Vec<f32>>,
        metadata: Vec<serde_json::Value>,
    ) -> Result<(), StoreError>;

    /// Number of vectors currently in the store.
    fn len(&self) -> usize;

    /// True when the store holds no vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality the store is committed to, if any vectors exist.
    fn dimension(&self) -> Option<usize>;
}

/// Flat-file store: `index.bin` (magic, dimension, count, row-major f32 LE
/// vectors) paired with `meta.json` (JSON array, one record per vector).
///
/// The whole store is loaded on open and rewritten on append, matching the
/// scale this pipeline targets. Writes stage both files to `.tmp` siblings
/// before renaming either, so a failed append never corrupts the live pair.
#[derive(Debug)]
pub struct FlatVectorStore {
    index_path: PathBuf,
    meta_path: PathBuf,
    vectors: Vec<Vec<f32>>,
    metadata: Vec<serde_json::Value>,
}

impl FlatVectorStore {
    /// Opens the store bound to the given file pair, loading existing
    /// contents when both files are present.
    pub fn open(
        index_path: impl Into<PathBuf>,
        meta_path: impl Into<PathBuf>,
    ) -> Result<Self, StoreError> {
        let index_path = index_path.into();
        let meta_path = meta_path.into();
        let mut store = Self {
            index_path,
            meta_path,
            vectors: Vec::new(),
            metadata: Vec::new(),
        };
        if store.index_path.exists() && store.meta_path.exists() {
            store.load()?;
        }
        Ok(store)
    }

    /// Metadata records currently in the store, in append order.
    pub fn metadata(&self) -> &[serde_json::Value] {
        &self.metadata
    }

    /// Vectors currently in the store, in append order.
    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    fn load(&mut self) -> Result<(), StoreError> {
        let (dimension, vectors) = read_index_file(&self.index_path)?;
        let metadata = read_meta_file(&self.meta_path)?;
        if vectors.len() != metadata.len() {
            return Err(StoreError::Load(format!(
                "index holds {} vectors but metadata holds {} records",
                vectors.len(),
                metadata.len()
            )));
        }
        debug_assert!(vectors.iter().all(|v| v.len() == dimension));
        self.vectors = vectors;
        self.metadata = metadata;
        Ok(())
    }

    fn persist(&self) -> Result<(), StoreError> {
        let index_tmp = staging_path(&self.index_path);
        let meta_tmp = staging_path(&self.meta_path);

        write_index_file(&index_tmp, self.dimension().unwrap_or(0), &self.vectors)?;
        write_meta_file(&meta_tmp, &self.metadata)?;

        // Both staged files exist before either rename; a failure above
        // leaves the live pair untouched.
        fs::rename(&index_tmp, &self.index_path)?;
        fs::rename(&meta_tmp, &self.meta_path)?;
        Ok(())
    }
}

impl VectorStore for FlatVectorStore {
    fn append(
        &mut self,
        vectors: Vec<Vec<f32>>,
        metadata: Vec<serde_json::Value>,
    ) -> Result<(), StoreError> {
        if vectors.len() != metadata.len() {
            return Err(StoreError::LengthMismatch {
                vectors: vectors.len(),
                metadata: metadata.len(),
            });
        }
        if vectors.is_empty() {
            return Ok(());
        }

        let expected = self
            .dimension()
            .unwrap_or_else(|| vectors[0].len());
        for vector in &vectors {
            if vector.len() != expected {
                return Err(StoreError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
        }

        let prior_len = self.vectors.len();
        self.vectors.extend(vectors);
        self.metadata.extend(metadata);
        match self.persist() {
            Ok(()) => Ok(()),
            Err(err) => {
                // Keep the in-memory view aligned with what is on disk.
                self.vectors.truncate(prior_len);
                self.metadata.truncate(prior_len);
                Err(err)
            }
        }
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn dimension(&self) -> Option<usize> {
        self.vectors.first().map(Vec::len)
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn read_index_file(path: &Path) -> Result<(usize, Vec<Vec<f32>>), StoreError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 8];
    reader
        .read_exact(&mut magic)
        .map_err(|_| StoreError::Load("index file too short for header".to_string()))?;
    if &magic != INDEX_MAGIC {
        return Err(StoreError::Load("index file has unknown magic".to_string()));
    }

    let mut dim_bytes = [0u8; 4];
    let mut count_bytes = [0u8; 8];
    reader
        .read_exact(&mut dim_bytes)
        .map_err(|_| StoreError::Load("index file missing dimension".to_string()))?;
    reader
        .read_exact(&mut count_bytes)
        .map_err(|_| StoreError::Load("index file missing vector count".to_string()))?;
    let dimension = u32::from_le_bytes(dim_bytes) as usize;
    let count = u64::from_le_bytes(count_bytes) as usize;

    let mut vectors = Vec::with_capacity(count);
    let mut value = [0u8; 4];
    for _ in 0..count {
        let mut vector = Vec::with_capacity(dimension);
        for _ in 0..dimension {
            reader
                .read_exact(&mut value)
                .map_err(|_| StoreError::Load("index file truncated mid-vector".to_string()))?;
            vector.push(f32::from_le_bytes(value));
        }
        vectors.push(vector);
    }
    Ok((dimension, vectors))
}

fn write_index_file(path: &Path, dimension: usize, vectors: &[Vec<f32>]) -> Result<(), StoreError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(INDEX_MAGIC)?;
    writer.write_all(&(dimension as u32).to_le_bytes())?;
    writer.write_all(&(vectors.len() as u64).to_le_bytes())?;
    for vector in vectors {
        for value in vector {
            writer.write_all(&value.to_le_bytes())?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn read_meta_file(path: &Path) -> Result<Vec<serde_json::Value>, StoreError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|err| StoreError::Load(format!("invalid metadata file: {err}")))
}

fn write_meta_file(path: &Path, metadata: &[serde_json::Value]) -> Result<(), StoreError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, metadata)
        .map_err(|err| StoreError::Write(io::Error::other(err)))?;
    writer.flush()?;
    Ok(())
}
