mod config;
mod document;
mod metadata;

pub use config::{
    ChunkingConfig, Config, DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_URL, DEFAULT_INDEX_NAME,
    DEFAULT_NAMESPACE, DEFAULT_REGION, EmbeddingConfig, VectorStoreConfig,
};
pub use document::{Document, DocumentChunk};
pub use metadata::{Metadata, MetadataValue, parse_metadata};
