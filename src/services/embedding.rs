//! Embedding client for the Cohere `v2/embed` API.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::EmbeddingError;
use crate::models::EmbeddingConfig;
use crate::utils::retry::{RetryConfig, with_retry};

/// Dimension of the dense vectors requested from the API.
pub const EMBEDDING_DIM: usize = 1024;

/// Input-type tag sent with every embed request.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    /// For indexing documents
    SearchDocument,
    /// For search queries
    SearchQuery,
}

/// Request body for the embed endpoint.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    texts: &'a [String],
    input_type: InputType,
    embedding_types: [&'static str; 1],
    output_dimension: usize,
}

/// Response from the embed endpoint. Embeddings are grouped by requested
/// type; only the float variant is used.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: EmbeddingsByType,
}

#[derive(Debug, Default, Deserialize)]
struct EmbeddingsByType {
    #[serde(default)]
    float: Vec<Vec<f32>>,
}

/// Error body returned by the API on failure.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the external embedding API.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    batch_size: usize,
    retry: RetryConfig,
}

impl EmbeddingClient {
    /// Create a new embedding client with the given configuration.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            batch_size: config.batch_size,
            retry: RetryConfig::new(config.max_attempts),
        })
    }

    /// Maximum number of texts sent in a single request.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Embed a list of texts, in order, splitting into bounded batches.
    ///
    /// Transient failures (timeouts, rate limits, 5xx) are retried with
    /// backoff; permanent failures are surfaced immediately.
    pub async fn embed(
        &self,
        texts: &[String],
        input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let batch_vectors =
                with_retry(&self.retry, || self.embed_batch(batch, input_type)).await?;
            vectors.extend(batch_vectors);
        }
        Ok(vectors)
    }

    /// Issue a single embed request for one batch.
    async fn embed_batch(
        &self,
        texts: &[String],
        input_type: InputType,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = EmbedRequest {
            model: &self.model,
            texts,
            input_type,
            embedding_types: ["float"],
            output_dimension: EMBEDDING_DIM,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| status.to_string());
            return Err(EmbeddingError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        let vectors = body.embeddings.float;
        if vectors.is_empty() {
            return Err(EmbeddingError::InvalidResponse(
                "no float embeddings in response".to_string(),
            ));
        }
        if vectors.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                requested: texts.len(),
                received: vectors.len(),
            });
        }
        for vector in &vectors {
            if vector.len() != EMBEDDING_DIM {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: EMBEDDING_DIM,
                    received: vector.len(),
                });
            }
        }

        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let texts = vec!["first chunk".to_string(), "second chunk".to_string()];
        let request = EmbedRequest {
            model: "embed-v4.0",
            texts: &texts,
            input_type: InputType::SearchDocument,
            embedding_types: ["float"],
            output_dimension: EMBEDDING_DIM,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "embed-v4.0");
        assert_eq!(json["input_type"], "search_document");
        assert_eq!(json["embedding_types"][0], "float");
        assert_eq!(json["output_dimension"], 1024);
        assert_eq!(json["texts"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_query_input_type_tag() {
        let json = serde_json::to_value(InputType::SearchQuery).unwrap();
        assert_eq!(json, "search_query");
    }

    #[test]
    fn test_response_deserialization() {
        let body = r#"{
            "id": "abc",
            "embeddings": {"float": [[0.1, 0.2], [0.3, 0.4]]},
            "texts": ["a", "b"]
        }"#;
        let response: EmbedResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.embeddings.float.len(), 2);
        assert_eq!(response.embeddings.float[0], vec![0.1, 0.2]);
    }

    #[test]
    fn test_response_without_float_embeddings() {
        let body = r#"{"embeddings": {"int8": [[1, 2]]}}"#;
        let response: EmbedResponse = serde_json::from_str(body).unwrap();
        assert!(response.embeddings.float.is_empty());
    }
}
