//! Shared metadata records stored alongside vectors in the index.

use serde::{Deserialize, Serialize};

/// Source tag applied to every record produced by notes ingestion.
pub const NOTES_SOURCE: &str = "notes";

/// Provenance record for one ingested note section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMetadata {
    /// Origin of the text; always `"notes"` for the notes pipeline.
    pub source: String,
    /// Position of the section within the ingestion call that produced it.
    pub chunk_index: usize,
    /// Original section text, stored verbatim.
    pub text: String,
}

impl SectionMetadata {
    /// Builds the record for a note section at the given position.
    pub fn for_note(chunk_index: usize, text: impl Into<String>) -> Self {
        Self {
            source: NOTES_SOURCE.to_string(),
            chunk_index,
            text: text.into(),
        }
    }
}

/// Provenance record for one chunk of an ingested document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Source tag identifying the originating document.
    pub source: String,
    /// Position of the chunk within its own document.
    pub chunk_index: usize,
    /// Chunk length in characters.
    pub char_count: usize,
    /// Chunk text, stored verbatim.
    pub text: String,
}

impl DocumentMetadata {
    /// Builds the record for a document chunk at the given position.
    pub fn new(source: impl Into<String>, chunk_index: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            source: source.into(),
            chunk_index,
            char_count: text.chars().count(),
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_record_carries_constant_source() {
        let record = SectionMetadata::for_note(3, "Buy milk");
        assert_eq!(record.source, "notes");
        assert_eq!(record.chunk_index, 3);
        assert_eq!(record.text, "Buy milk");
    }

    #[test]
    fn document_record_counts_chars_not_bytes() {
        let record = DocumentMetadata::new("lecture.pdf", 0, "héllo");
        assert_eq!(record.char_count, 5);
        assert_eq!(record.text, "héllo");
    }

    #[test]
    fn note_record_round_trips_through_json() {
        let record = SectionMetadata::for_note(1, "Call Alice");
        let json = serde_json::to_string(&record).expect("serialize");
        let back: SectionMetadata = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, record);
    }
}
