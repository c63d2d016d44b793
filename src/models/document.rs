//! Document and chunk records.

use serde::{Deserialize, Serialize};

use super::metadata::Metadata;

/// A document submitted for upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
}

impl Document {
    /// Generate a fresh document ID.
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// The ID prefix shared by every chunk vector of a document. Prefix
    /// listing, deletion, and metadata patching all key off this.
    pub fn chunk_prefix(doc_id: &str) -> String {
        format!("{doc_id}#")
    }

    pub fn new(text: String, doc_id: Option<String>, metadata: Metadata) -> Self {
        Self {
            id: doc_id.unwrap_or_else(Self::generate_id),
            text,
            metadata,
        }
    }
}

/// A contiguous span of a document's text, immutable once created.
///
/// Offsets are in characters, start inclusive and end exclusive. The
/// embedding is filled in after the chunk is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub document_id: String,
    pub chunk_index: u32,
    pub start_char: u64,
    pub end_char: u64,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embedding: Vec<f32>,
    pub metadata: Metadata,
}

impl DocumentChunk {
    /// Derive the chunk ID from the document ID and sequence index. The
    /// result always starts with [`Document::chunk_prefix`].
    pub fn generate_id(document_id: &str, chunk_index: u32) -> String {
        format!("{document_id}#chunk-{chunk_index}")
    }

    pub fn from_document(
        document: &Document,
        text: String,
        chunk_index: u32,
        start_char: u64,
        end_char: u64,
    ) -> Self {
        Self {
            id: Self::generate_id(&document.id, chunk_index),
            document_id: document.id.clone(),
            chunk_index,
            start_char,
            end_char,
            text,
            embedding: Vec::new(),
            metadata: document.metadata.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_document_id_is_unique() {
        assert_ne!(Document::generate_id(), Document::generate_id());
    }

    #[test]
    fn test_chunk_id_is_deterministic() {
        let id = DocumentChunk::generate_id("doc-1", 3);
        assert_eq!(id, "doc-1#chunk-3");
        assert_eq!(id, DocumentChunk::generate_id("doc-1", 3));
        assert_ne!(id, DocumentChunk::generate_id("doc-1", 4));
    }

    #[test]
    fn test_chunk_ids_share_document_prefix() {
        let prefix = Document::chunk_prefix("doc-1");
        for index in 0..5 {
            assert!(DocumentChunk::generate_id("doc-1", index).starts_with(&prefix));
        }
        // Another document's chunks never match
        assert!(!DocumentChunk::generate_id("doc-10", 0).starts_with("doc-1#"));
    }

    #[test]
    fn test_from_document_inherits_metadata() {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), "manual".into());
        let doc = Document::new("some text".to_string(), Some("d".to_string()), metadata);

        let chunk = DocumentChunk::from_document(&doc, "some".to_string(), 0, 0, 4);
        assert_eq!(chunk.document_id, "d");
        assert_eq!(chunk.id, "d#chunk-0");
        assert_eq!(chunk.metadata, doc.metadata);
        assert!(chunk.embedding.is_empty());
    }
}
