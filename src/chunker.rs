//! Text chunking for embedding: whitespace normalization plus overlapping
//! character windows.

/// Tunable knobs for splitting text into embeddable chunks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkConfig {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl ChunkConfig {
    /// Constructs a chunking configuration. A zero chunk size is bumped to 1.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
        }
    }

    /// Maximum characters per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Characters shared between consecutive chunks.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Window advance per chunk; always at least one character so chunking
    /// terminates even when the overlap meets or exceeds the chunk size.
    fn step(&self) -> usize {
        self.chunk_size.saturating_sub(self.chunk_overlap).max(1)
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 200,
        }
    }
}

/// Splits text into overlapping chunks suitable for embedding.
///
/// Runs of whitespace collapse to single spaces before windowing, so chunk
/// boundaries are stable regardless of the input's original layout. Offsets
/// count characters, never bytes, so multi-byte text is never split inside a
/// code point. Empty or whitespace-only input yields no chunks.
pub fn chunk_text(text: &str, config: &ChunkConfig) -> Vec<String> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = normalized.chars().collect();
    if chars.len() <= config.chunk_size() {
        return vec![normalized];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < chars.len() {
        let end = (start + config.chunk_size()).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += config.step();
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        let config = ChunkConfig::default();
        assert!(chunk_text("", &config).is_empty());
        assert!(chunk_text("   \n\t ", &config).is_empty());
    }

    #[test]
    fn short_input_is_a_single_normalized_chunk() {
        let config = ChunkConfig::default();
        let chunks = chunk_text("one\n two   three", &config);
        assert_eq!(chunks, vec!["one two three".to_string()]);
    }

    #[test]
    fn long_input_produces_overlapping_windows() {
        let config = ChunkConfig::new(10, 4);
        let text = "abcdefghijklmnopqrstuvwxyz";
        let chunks = chunk_text(text, &config);
        assert_eq!(chunks[0], "abcdefghij");
        // Each window starts chunk_size - overlap after the previous one.
        assert_eq!(chunks[1], "ghijklmnop");
        assert_eq!(chunks[2], "mnopqrstuv");
        assert_eq!(chunks.last().unwrap(), "stuvwxyz");
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 10);
        }
    }

    #[test]
    fn windows_count_chars_not_bytes() {
        let config = ChunkConfig::new(4, 1);
        let chunks = chunk_text("ééééééé", &config);
        assert_eq!(chunks[0].chars().count(), 4);
        for chunk in &chunks {
            assert!(chunk.chars().all(|c| c == 'é'));
        }
    }

    #[test]
    fn oversized_overlap_still_terminates() {
        let config = ChunkConfig::new(4, 9);
        let chunks = chunk_text("abcdefgh", &config);
        // Step clamps to one character; every position starts a window.
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0], "abcd");
        assert_eq!(chunks[4], "efgh");
    }
}
