//! Upload orchestration: chunk, embed, upsert.

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::UploadError;
use crate::models::{Config, Document, DocumentChunk, Metadata};
use crate::services::chunker::TextChunker;
use crate::services::embedding::{EMBEDDING_DIM, EmbeddingClient, InputType};
use crate::services::vector_store::{VectorRecord, VectorStoreClient};
use crate::utils::file::{calculate_checksum, read_text_with_fallback};

/// File extensions uploaded by default when walking a directory.
pub const DEFAULT_EXTENSIONS: &[&str] = &["txt", "md", "py", "js", "ts", "html", "css", "json"];

/// Result of a successful upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    pub doc_id: String,
    pub chunk_count: usize,
}

/// One uploaded file within a directory upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub doc_id: String,
    pub chunk_count: usize,
}

/// One failed file within a directory upload.
#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub error: String,
}

/// Aggregate outcome of a directory upload. A failure on one file does not
/// abort the others.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectorySummary {
    pub uploaded: Vec<UploadedFile>,
    pub failures: Vec<FailedFile>,
}

/// Orchestrates document uploads into the vector index.
pub struct Uploader {
    chunker: TextChunker,
    embedder: EmbeddingClient,
    store: VectorStoreClient,
    embedding_model: String,
}

impl Uploader {
    /// Build the pipeline from configuration and connect to the index.
    pub async fn connect(config: &Config) -> Result<Self, UploadError> {
        let embedder = EmbeddingClient::new(&config.embedding)?;
        let store = VectorStoreClient::connect(&config.vector_store).await?;

        Ok(Self {
            chunker: TextChunker::new(&config.chunking),
            embedder,
            store,
            embedding_model: config.embedding.model.clone(),
        })
    }

    /// Assemble an uploader from already-built parts.
    pub fn new(
        chunker: TextChunker,
        embedder: EmbeddingClient,
        store: VectorStoreClient,
        embedding_model: String,
    ) -> Self {
        Self {
            chunker,
            embedder,
            store,
            embedding_model,
        }
    }

    pub fn store(&self) -> &VectorStoreClient {
        &self.store
    }

    /// Upload raw text as one document.
    ///
    /// When the caller reuses an explicit `doc_id`, vectors under its prefix
    /// are deleted first so a shorter re-upload leaves no stale tail chunks.
    /// On a mid-upload failure the error reports how many chunks were
    /// already committed; nothing is rolled back.
    pub async fn upload_text(
        &self,
        text: &str,
        doc_id: Option<String>,
        metadata: Metadata,
    ) -> Result<UploadReceipt, UploadError> {
        if text.trim().is_empty() {
            return Err(UploadError::EmptyInput);
        }

        let explicit_id = doc_id.is_some();
        let document = Document::new(text.to_string(), doc_id, metadata);

        let chunks = self.chunker.chunk(&document);
        if chunks.is_empty() {
            return Err(UploadError::EmptyInput);
        }

        if explicit_id {
            self.store
                .delete_by_prefix(&Document::chunk_prefix(&document.id))
                .await?;
        }

        let uploaded_at = chrono::Utc::now().to_rfc3339();
        let mut committed = 0usize;

        for batch in chunks.chunks(self.embedder.batch_size()) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embeddings = self
                .embedder
                .embed(&texts, InputType::SearchDocument)
                .await
                .map_err(|e| UploadError::aborted(committed, e))?;

            let records: Vec<VectorRecord> = batch
                .iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| self.to_record(chunk, embedding, &uploaded_at))
                .collect();

            self.store
                .upsert(&records)
                .await
                .map_err(|e| UploadError::aborted(committed, e))?;
            committed += batch.len();
        }

        Ok(UploadReceipt {
            doc_id: document.id,
            chunk_count: committed,
        })
    }

    /// Upload a single file. File metadata (name, path, size, extension,
    /// checksum) is attached to every chunk; caller-supplied keys win.
    pub async fn upload_file(
        &self,
        path: &Path,
        doc_id: Option<String>,
        metadata: Metadata,
    ) -> Result<UploadReceipt, UploadError> {
        if !path.exists() {
            return Err(UploadError::FileNotFound(path.to_path_buf()));
        }

        let text = read_text_with_fallback(path).map_err(|source| UploadError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let mut merged = file_metadata(path, &text);
        merged.extend(metadata);

        self.upload_text(&text, doc_id, merged).await
    }

    /// Upload every matching file under a directory, recursively.
    ///
    /// `extensions` defaults to [`DEFAULT_EXTENSIONS`]. Per-file failures
    /// are collected into the summary instead of aborting the walk.
    pub async fn upload_directory(
        &self,
        dir: &Path,
        extensions: Option<&[String]>,
        metadata: Metadata,
    ) -> Result<DirectorySummary, UploadError> {
        let files = Self::collect_files(dir, extensions)?;

        let mut summary = DirectorySummary::default();
        for path in files {
            match self.upload_file(&path, None, metadata.clone()).await {
                Ok(receipt) => summary.uploaded.push(UploadedFile {
                    path,
                    doc_id: receipt.doc_id,
                    chunk_count: receipt.chunk_count,
                }),
                Err(error) => summary.failures.push(FailedFile {
                    path,
                    error: error.to_string(),
                }),
            }
        }

        Ok(summary)
    }

    /// List the files a directory upload would process, in walk order.
    pub fn collect_files(
        dir: &Path,
        extensions: Option<&[String]>,
    ) -> Result<Vec<PathBuf>, UploadError> {
        if !dir.is_dir() {
            return Err(UploadError::NotADirectory(dir.to_path_buf()));
        }

        let allowed: Vec<String> = match extensions {
            Some(exts) => exts
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            None => DEFAULT_EXTENSIONS.iter().map(ToString::to_string).collect(),
        };

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(_) => continue,
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let matches = path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .is_some_and(|ext| allowed.iter().any(|a| *a == ext));
            if matches {
                files.push(path.to_path_buf());
            }
        }

        if files.is_empty() {
            return Err(UploadError::NoFilesFound(dir.to_path_buf()));
        }

        files.sort();
        Ok(files)
    }

    /// Remove every chunk vector of a document.
    pub async fn delete_document(&self, doc_id: &str) -> Result<usize, UploadError> {
        let deleted = self
            .store
            .delete_by_prefix(&Document::chunk_prefix(doc_id))
            .await?;
        Ok(deleted)
    }

    /// Patch metadata on every chunk of a document without re-embedding.
    pub async fn update_document_metadata(
        &self,
        doc_id: &str,
        delta: &Metadata,
    ) -> Result<usize, UploadError> {
        if delta.is_empty() {
            return Err(UploadError::EmptyMetadata);
        }

        let updated = self
            .store
            .update_metadata_by_prefix(&Document::chunk_prefix(doc_id), delta)
            .await?;
        Ok(updated)
    }

    /// Build the stored record for one embedded chunk. Chunk position fields
    /// overwrite any caller metadata of the same name.
    fn to_record(&self, chunk: &DocumentChunk, embedding: Vec<f32>, uploaded_at: &str) -> VectorRecord {
        let mut metadata = chunk.metadata.clone();
        metadata.insert("doc_id".to_string(), chunk.document_id.clone().into());
        metadata.insert("chunk_index".to_string(), chunk.chunk_index.into());
        metadata.insert("start_char".to_string(), chunk.start_char.into());
        metadata.insert("end_char".to_string(), chunk.end_char.into());
        metadata.insert("text".to_string(), chunk.text.clone().into());
        metadata.insert(
            "embedding_model".to_string(),
            self.embedding_model.clone().into(),
        );
        metadata.insert(
            "embedding_dimensions".to_string(),
            (EMBEDDING_DIM as u64).into(),
        );
        metadata.insert("uploaded_at".to_string(), uploaded_at.into());

        VectorRecord {
            id: chunk.id.clone(),
            values: embedding,
            metadata,
        }
    }
}

/// Metadata derived from the file itself.
fn file_metadata(path: &Path, content: &str) -> Metadata {
    let mut metadata = Metadata::new();
    if let Some(name) = path.file_name() {
        metadata.insert(
            "file_name".to_string(),
            name.to_string_lossy().to_string().into(),
        );
    }
    metadata.insert(
        "file_path".to_string(),
        path.to_string_lossy().to_string().into(),
    );
    metadata.insert("file_size".to_string(), (content.len() as u64).into());
    if let Some(ext) = path.extension() {
        metadata.insert(
            "file_extension".to_string(),
            ext.to_string_lossy().to_string().into(),
        );
    }
    metadata.insert("checksum".to_string(), calculate_checksum(content).into());
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetadataValue;
    use std::fs;

    #[test]
    fn test_file_metadata_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "hello").unwrap();

        let metadata = file_metadata(&path, "hello");
        assert_eq!(metadata["file_name"], MetadataValue::String("notes.md".into()));
        assert_eq!(metadata["file_extension"], MetadataValue::String("md".into()));
        assert_eq!(metadata["file_size"], MetadataValue::Number(5.0));
        assert!(matches!(metadata["checksum"], MetadataValue::String(_)));
    }

    #[test]
    fn test_caller_metadata_overrides_file_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "content").unwrap();

        let mut merged = file_metadata(&path, "content");
        let mut caller = Metadata::new();
        caller.insert("file_name".to_string(), "renamed.txt".into());
        caller.insert("category".to_string(), "farming".into());
        merged.extend(caller);

        assert_eq!(
            merged["file_name"],
            MetadataValue::String("renamed.txt".into())
        );
        assert_eq!(merged["category"], MetadataValue::String("farming".into()));
    }

    #[test]
    fn test_collect_files_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.md"), "b").unwrap();
        fs::write(dir.path().join("c.bin"), "c").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/d.py"), "d").unwrap();

        let files = Uploader::collect_files(dir.path(), None).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.md", "d.py"]);
    }

    #[test]
    fn test_collect_files_custom_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("b.rst"), "b").unwrap();

        let exts = vec![".rst".to_string()];
        let files = Uploader::collect_files(dir.path(), Some(&exts)).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("b.rst"));
    }

    #[test]
    fn test_collect_files_rejects_non_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "a").unwrap();

        assert!(matches!(
            Uploader::collect_files(&file, None),
            Err(UploadError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_collect_files_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Uploader::collect_files(dir.path(), None),
            Err(UploadError::NoFilesFound(_))
        ));
    }
}
