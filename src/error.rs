//! Error types for the document uploader.

use std::path::PathBuf;

use thiserror::Error;

use crate::utils::retry::Retryable;

/// Errors related to configuration resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Errors related to metadata parsing and validation.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata must be a JSON object")]
    NotAnObject,

    #[error(
        "unsupported value for metadata key {key:?}: {kind} (only strings, numbers, and booleans are allowed)"
    )]
    UnsupportedValue { key: String, kind: &'static str },

    #[error("metadata parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Errors related to the embedding API.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("embedding API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("embedding count mismatch: requested {requested}, received {received}")]
    CountMismatch { requested: usize, received: usize },

    #[error("embedding dimension mismatch: expected {expected}, received {received}")]
    DimensionMismatch { expected: usize, received: usize },
}

impl Retryable for EmbeddingError {
    fn is_retryable(&self) -> bool {
        match self {
            EmbeddingError::RequestError(e) => e.is_timeout() || e.is_connect(),
            // Rate limits and server-side failures are transient
            EmbeddingError::ApiError { status, .. } => is_transient_status(*status),
            EmbeddingError::InvalidResponse(_)
            | EmbeddingError::CountMismatch { .. }
            | EmbeddingError::DimensionMismatch { .. } => false,
        }
    }
}

/// Errors related to the vector store API.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("vector store request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("vector store API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("index error: {0}")]
    IndexError(String),

    #[error("invalid vector store response: {0}")]
    InvalidResponse(String),
}

impl Retryable for VectorStoreError {
    fn is_retryable(&self) -> bool {
        match self {
            VectorStoreError::RequestError(e) => e.is_timeout() || e.is_connect(),
            VectorStoreError::ApiError { status, .. } => is_transient_status(*status),
            VectorStoreError::IndexError(_) | VectorStoreError::InvalidResponse(_) => false,
        }
    }
}

/// HTTP statuses worth retrying: request timeout, rate limit, server errors.
fn is_transient_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..=599).contains(&status)
}

/// Errors related to upload operations.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("input text is empty")]
    EmptyInput,

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("no files with matching extensions found in {0}")]
    NoFilesFound(PathBuf),

    #[error("metadata delta is empty")]
    EmptyMetadata,

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),

    #[error("upload aborted after {committed} chunks were committed: {source}")]
    Aborted {
        committed: usize,
        #[source]
        source: Box<UploadError>,
    },
}

impl UploadError {
    /// Wrap an error with the number of chunks already upserted.
    pub fn aborted(committed: usize, source: impl Into<UploadError>) -> Self {
        UploadError::Aborted {
            committed,
            source: Box::new(source.into()),
        }
    }

    /// Number of chunks committed before the failure, if any.
    pub fn committed_chunks(&self) -> usize {
        match self {
            UploadError::Aborted { committed, .. } => *committed,
            _ => 0,
        }
    }
}

/// Application-level errors that wrap domain errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),

    #[error("{0}")]
    Other(String),
}
