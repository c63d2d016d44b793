//! Sliding-window text chunking with sentence-boundary preference.

use crate::models::{ChunkingConfig, Document, DocumentChunk};

/// How far back from the target boundary to look for a sentence end.
pub const BOUNDARY_SEARCH_WINDOW: usize = 100;

/// Splits document text into overlapping chunks.
///
/// Chunks cover the whole input with no gaps; consecutive chunks share
/// `overlap` characters of context. All offsets are character offsets.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker. The configuration is expected to be validated
    /// (`overlap < chunk_size`); a degenerate overlap falls back to
    /// non-overlapping windows rather than looping.
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.max(1),
            overlap: config.chunk_overlap,
        }
    }

    /// Create a chunker with default settings.
    pub fn with_defaults() -> Self {
        Self::new(&ChunkingConfig::default())
    }

    /// Chunk a document into ordered, overlapping segments.
    ///
    /// Empty input yields zero chunks; the uploader turns that into an
    /// input error. Input shorter than the chunk size yields exactly one
    /// chunk equal to the input.
    pub fn chunk(&self, document: &Document) -> Vec<DocumentChunk> {
        self.split(&document.text)
            .into_iter()
            .enumerate()
            .map(|(index, (text, start, end))| {
                DocumentChunk::from_document(document, text, index as u32, start, end)
            })
            .collect()
    }

    /// Split text into (content, start_char, end_char) spans.
    fn split(&self, text: &str) -> Vec<(String, u64, u64)> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();
        let mut spans = Vec::new();

        if total == 0 {
            return spans;
        }

        let mut start = 0;
        loop {
            let target_end = (start + self.chunk_size).min(total);
            let end = if target_end < total {
                self.find_boundary(&chars, start, target_end)
            } else {
                target_end
            };

            let content: String = chars[start..end].iter().collect();
            // Whitespace-only windows produce no chunk record
            if !content.trim().is_empty() {
                spans.push((content, start as u64, end as u64));
            }

            if end >= total {
                break;
            }

            // Step forward, keeping `overlap` characters of context
            let next = end.saturating_sub(self.overlap);
            start = if next > start { next } else { end };
        }

        spans
    }

    /// Find a sentence boundary near the target end, searching the last
    /// [`BOUNDARY_SEARCH_WINDOW`] characters of the window. Falls back to a
    /// hard cut at `target_end`.
    fn find_boundary(&self, chars: &[char], start: usize, target_end: usize) -> usize {
        let search_start = target_end.saturating_sub(BOUNDARY_SEARCH_WINDOW).max(start);

        for (offset, c) in chars[search_start..target_end].iter().enumerate() {
            if matches!(c, '.' | '!' | '?') {
                return search_start + offset + 1;
            }
        }

        target_end
    }
}
