//! Environment-backed configuration, resolved once at startup.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_INDEX_NAME: &str = "farmer-voice-index";
pub const DEFAULT_NAMESPACE: &str = "farmer-rag";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "embed-v4.0";
pub const DEFAULT_EMBEDDING_URL: &str = "https://api.cohere.com/v2/embed";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub vector_store: VectorStoreConfig,
    pub embedding: EmbeddingConfig,
    pub chunking: ChunkingConfig,
}

impl Config {
    /// Resolve configuration from the environment (a `.env` file is honored
    /// if present). API keys are required; everything else has defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            vector_store: VectorStoreConfig {
                api_key: require_var("PINECONE_API_KEY")?,
                region: var_or("PINECONE_ENVIRONMENT", DEFAULT_REGION),
                index: var_or("PINECONE_INDEX_NAME", DEFAULT_INDEX_NAME),
                namespace: var_or("PINECONE_NAMESPACE", DEFAULT_NAMESPACE),
                upsert_batch_size: default_upsert_batch_size(),
                timeout_secs: default_timeout(),
                max_attempts: default_max_attempts(),
            },
            embedding: EmbeddingConfig {
                api_key: require_var("COHERE_API_KEY")?,
                url: var_or("COHERE_API_URL", DEFAULT_EMBEDDING_URL),
                model: var_or("COHERE_EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
                batch_size: default_embed_batch_size(),
                timeout_secs: default_timeout(),
                max_attempts: default_max_attempts(),
            },
            chunking: ChunkingConfig {
                chunk_size: parsed_var_or("RAGUP_CHUNK_SIZE", default_chunk_size())?,
                chunk_overlap: parsed_var_or("RAGUP_CHUNK_OVERLAP", default_chunk_overlap())?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chunking.validate()?;

        if self.vector_store.index.is_empty() {
            return Err(ConfigError::ValidationError(
                "index name must not be empty".to_string(),
            ));
        }
        if self.vector_store.namespace.is_empty() {
            return Err(ConfigError::ValidationError(
                "namespace must not be empty".to_string(),
            ));
        }
        if self.vector_store.upsert_batch_size == 0 || self.embedding.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "batch sizes must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parsed_var_or(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => {
            value.parse().map_err(|_| ConfigError::InvalidValue {
                var: name,
                reason: format!("expected a positive integer, got {value:?}"),
            })
        }
        _ => Ok(default),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    #[serde(skip_serializing)]
    pub api_key: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_index_name")]
    pub index: String,

    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_upsert_batch_size")]
    pub upsert_batch_size: usize,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(skip_serializing)]
    pub api_key: String,

    #[serde(default = "default_embedding_url")]
    pub url: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_embed_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "chunk size must be positive".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::ValidationError(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_index_name() -> String {
    DEFAULT_INDEX_NAME.to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_embedding_url() -> String {
    DEFAULT_EMBEDDING_URL.to_string()
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_upsert_batch_size() -> usize {
    100
}

// Cohere caps a single embed call at 96 texts
fn default_embed_batch_size() -> usize {
    96
}

fn default_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}
