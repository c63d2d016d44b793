//! Vector store client for the Pinecone REST API.
//!
//! The control plane (`api.pinecone.io`) manages indexes; the data plane
//! lives on the per-index host returned by describe-index.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::error::VectorStoreError;
use crate::models::{Metadata, VectorStoreConfig};
use crate::services::embedding::EMBEDDING_DIM;
use crate::utils::retry::{RetryConfig, with_retry};

const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
const API_VERSION: &str = "2025-01";

/// How long to wait for a freshly created index to become ready.
const READY_POLL_ATTEMPTS: u32 = 30;
const READY_POLL_DELAY: Duration = Duration::from_secs(2);

/// Maximum ids per delete request.
const DELETE_BATCH_SIZE: usize = 1000;

/// An (id, vector, metadata) triple as stored in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

/// Vector counts reported by the index.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub dimension: u64,
    pub total_vectors: u64,
    pub namespace_vectors: u64,
}

#[derive(Debug, Deserialize)]
struct ListIndexesResponse {
    #[serde(default)]
    indexes: Vec<IndexSummary>,
}

#[derive(Debug, Deserialize)]
struct IndexSummary {
    name: String,
}

#[derive(Debug, Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'static str,
    spec: IndexSpec<'a>,
}

#[derive(Debug, Serialize)]
struct IndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Debug, Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'static str,
    region: &'a str,
}

#[derive(Debug, Deserialize)]
struct DescribeIndexResponse {
    host: String,
    #[serde(default)]
    status: IndexStatus,
}

#[derive(Debug, Default, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
struct ListVectorsResponse {
    #[serde(default)]
    vectors: Vec<ListedVector>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct ListedVector {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    next: String,
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    ids: &'a [String],
    namespace: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id: &'a str,
    set_metadata: &'a Metadata,
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
struct FetchResponse {
    #[serde(default)]
    vectors: HashMap<String, VectorRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeStatsResponse {
    #[serde(default)]
    dimension: u64,
    #[serde(default)]
    total_vector_count: u64,
    #[serde(default)]
    namespaces: HashMap<String, NamespaceStats>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceStats {
    #[serde(default)]
    vector_count: u64,
}

/// Client for one namespace of a managed vector index.
pub struct VectorStoreClient {
    client: Client,
    api_key: String,
    host: String,
    index: String,
    namespace: String,
    upsert_batch_size: usize,
    retry: RetryConfig,
}

impl VectorStoreClient {
    /// Connect to the configured index, creating it if it does not exist,
    /// and resolve the data-plane host.
    pub async fn connect(config: &VectorStoreConfig) -> Result<Self, VectorStoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let retry = RetryConfig::new(config.max_attempts);
        let mut this = Self {
            client,
            api_key: config.api_key.clone(),
            host: String::new(),
            index: config.index.clone(),
            namespace: config.namespace.clone(),
            upsert_batch_size: config.upsert_batch_size,
            retry,
        };

        this.ensure_index(&config.region).await?;
        Ok(this)
    }

    /// Data-plane host of the connected index.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Create the serverless index if absent, then wait for it to become
    /// ready. Idempotent.
    async fn ensure_index(&mut self, region: &str) -> Result<(), VectorStoreError> {
        let existing = with_retry(&self.retry, || self.list_indexes()).await?;

        if !existing.iter().any(|name| name == &self.index) {
            with_retry(&self.retry, || self.create_index(region)).await?;
        }

        for _ in 0..READY_POLL_ATTEMPTS {
            let described = with_retry(&self.retry, || self.describe_index()).await?;
            if described.status.ready {
                self.host = format!("https://{}", described.host);
                return Ok(());
            }
            tokio::time::sleep(READY_POLL_DELAY).await;
        }

        Err(VectorStoreError::IndexError(format!(
            "index {} did not become ready",
            self.index
        )))
    }

    async fn list_indexes(&self) -> Result<Vec<String>, VectorStoreError> {
        let response = self
            .client
            .get(format!("{CONTROL_PLANE_URL}/indexes"))
            .headers(self.headers())
            .send()
            .await?;
        let body: ListIndexesResponse = Self::check(response).await?.json().await?;
        Ok(body.indexes.into_iter().map(|i| i.name).collect())
    }

    async fn create_index(&self, region: &str) -> Result<(), VectorStoreError> {
        let request = CreateIndexRequest {
            name: &self.index,
            dimension: EMBEDDING_DIM,
            metric: "dotproduct",
            spec: IndexSpec {
                serverless: ServerlessSpec {
                    cloud: "aws",
                    region,
                },
            },
        };

        let response = self
            .client
            .post(format!("{CONTROL_PLANE_URL}/indexes"))
            .headers(self.headers())
            .json(&request)
            .send()
            .await?;

        // A concurrent creator winning the race is fine
        if response.status() == reqwest::StatusCode::CONFLICT {
            return Ok(());
        }
        Self::check(response).await?;
        Ok(())
    }

    async fn describe_index(&self) -> Result<DescribeIndexResponse, VectorStoreError> {
        let response = self
            .client
            .get(format!("{CONTROL_PLANE_URL}/indexes/{}", self.index))
            .headers(self.headers())
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Upsert vectors in batches. Re-upserting an existing id overwrites it.
    /// Returns the number of vectors written.
    pub async fn upsert(&self, records: &[VectorRecord]) -> Result<usize, VectorStoreError> {
        for batch in records.chunks(self.upsert_batch_size) {
            with_retry(&self.retry, || self.upsert_batch(batch)).await?;
        }
        Ok(records.len())
    }

    async fn upsert_batch(&self, batch: &[VectorRecord]) -> Result<(), VectorStoreError> {
        let request = UpsertRequest {
            vectors: batch,
            namespace: &self.namespace,
        };
        let response = self
            .client
            .post(format!("{}/vectors/upsert", self.host))
            .headers(self.headers())
            .json(&request)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// List all vector ids in the namespace that share `prefix`, following
    /// pagination.
    pub async fn list_ids(&self, prefix: &str) -> Result<Vec<String>, VectorStoreError> {
        let mut ids = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let page =
                with_retry(&self.retry, || self.list_page(prefix, token.as_deref())).await?;
            ids.extend(page.vectors.into_iter().map(|v| v.id));
            match page.pagination {
                Some(p) => token = Some(p.next),
                None => break,
            }
        }

        Ok(ids)
    }

    async fn list_page(
        &self,
        prefix: &str,
        token: Option<&str>,
    ) -> Result<ListVectorsResponse, VectorStoreError> {
        let mut query: Vec<(&str, &str)> = vec![
            ("namespace", &self.namespace),
            ("prefix", prefix),
            ("limit", "100"),
        ];
        if let Some(token) = token {
            query.push(("paginationToken", token));
        }

        let response = self
            .client
            .get(format!("{}/vectors/list", self.host))
            .headers(self.headers())
            .query(&query)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Delete vectors by id.
    pub async fn delete_by_ids(&self, ids: &[String]) -> Result<(), VectorStoreError> {
        for batch in ids.chunks(DELETE_BATCH_SIZE) {
            with_retry(&self.retry, || self.delete_batch(batch)).await?;
        }
        Ok(())
    }

    async fn delete_batch(&self, ids: &[String]) -> Result<(), VectorStoreError> {
        let request = DeleteRequest {
            ids,
            namespace: &self.namespace,
        };
        let response = self
            .client
            .post(format!("{}/vectors/delete", self.host))
            .headers(self.headers())
            .json(&request)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Delete every vector whose id shares `prefix`. Returns the number of
    /// ids removed.
    pub async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, VectorStoreError> {
        let ids = self.list_ids(prefix).await?;
        self.delete_by_ids(&ids).await?;
        Ok(ids.len())
    }

    /// Patch stored metadata for a single vector. Embeddings are untouched.
    pub async fn update_metadata(
        &self,
        id: &str,
        delta: &Metadata,
    ) -> Result<(), VectorStoreError> {
        with_retry(&self.retry, || self.update_one(id, delta)).await
    }

    async fn update_one(&self, id: &str, delta: &Metadata) -> Result<(), VectorStoreError> {
        let request = UpdateRequest {
            id,
            set_metadata: delta,
            namespace: &self.namespace,
        };
        let response = self
            .client
            .post(format!("{}/vectors/update", self.host))
            .headers(self.headers())
            .json(&request)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Patch stored metadata for every vector sharing `prefix`. Returns the
    /// number of vectors updated.
    pub async fn update_metadata_by_prefix(
        &self,
        prefix: &str,
        delta: &Metadata,
    ) -> Result<usize, VectorStoreError> {
        let ids = self.list_ids(prefix).await?;
        for id in &ids {
            self.update_metadata(id, delta).await?;
        }
        Ok(ids.len())
    }

    /// Fetch vectors (values and metadata) by id.
    pub async fn fetch(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, VectorRecord>, VectorStoreError> {
        let mut query: Vec<(&str, &str)> = vec![("namespace", &self.namespace)];
        for id in ids {
            query.push(("ids", id));
        }

        let response = self
            .client
            .get(format!("{}/vectors/fetch", self.host))
            .headers(self.headers())
            .query(&query)
            .send()
            .await?;
        let body: FetchResponse = Self::check(response).await?.json().await?;
        Ok(body.vectors)
    }

    /// Vector counts for the index and the configured namespace.
    pub async fn stats(&self) -> Result<IndexStats, VectorStoreError> {
        let response = self
            .client
            .post(format!("{}/describe_index_stats", self.host))
            .headers(self.headers())
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let body: DescribeStatsResponse = Self::check(response).await?.json().await?;

        let namespace_vectors = body
            .namespaces
            .get(&self.namespace)
            .map_or(0, |ns| ns.vector_count);

        Ok(IndexStats {
            dimension: body.dimension,
            total_vectors: body.total_vector_count,
            namespace_vectors,
        })
    }

    fn headers(&self) -> reqwest::header::HeaderMap {
        use reqwest::header::{HeaderMap, HeaderValue};

        let mut headers = HeaderMap::new();
        if let Ok(mut value) = HeaderValue::from_str(&self.api_key) {
            value.set_sensitive(true);
            headers.insert("Api-Key", value);
        }
        headers.insert("X-Pinecone-API-Version", HeaderValue::from_static(API_VERSION));
        headers
    }

    /// Map non-success responses to an API error with the server's message.
    async fn check(response: Response) -> Result<Response, VectorStoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("message")
                    .or_else(|| body.get("error").and_then(|e| e.get("message")))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| status.to_string());

        Err(VectorStoreError::ApiError {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetadataValue;

    #[test]
    fn test_upsert_request_serialization() {
        let mut metadata = Metadata::new();
        metadata.insert("doc_id".to_string(), "d1".into());
        metadata.insert("chunk_index".to_string(), 0u32.into());

        let records = vec![VectorRecord {
            id: "d1#chunk-0".to_string(),
            values: vec![0.1, 0.2, 0.3],
            metadata,
        }];
        let request = UpsertRequest {
            vectors: &records,
            namespace: "farmer-rag",
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["namespace"], "farmer-rag");
        assert_eq!(json["vectors"][0]["id"], "d1#chunk-0");
        assert_eq!(json["vectors"][0]["metadata"]["doc_id"], "d1");
        assert_eq!(json["vectors"][0]["metadata"]["chunk_index"], 0.0);
    }

    #[test]
    fn test_empty_metadata_omitted_from_upsert() {
        let record = VectorRecord {
            id: "v".to_string(),
            values: vec![1.0],
            metadata: Metadata::new(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn test_update_request_uses_set_metadata() {
        let mut delta = Metadata::new();
        delta.insert("reviewed".to_string(), true.into());
        let request = UpdateRequest {
            id: "d1#chunk-0",
            set_metadata: &delta,
            namespace: "ns",
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["setMetadata"]["reviewed"], true);
        assert_eq!(json["id"], "d1#chunk-0");
    }

    #[test]
    fn test_create_index_request_serialization() {
        let request = CreateIndexRequest {
            name: "farmer-voice-index",
            dimension: EMBEDDING_DIM,
            metric: "dotproduct",
            spec: IndexSpec {
                serverless: ServerlessSpec {
                    cloud: "aws",
                    region: "us-east-1",
                },
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["dimension"], 1024);
        assert_eq!(json["metric"], "dotproduct");
        assert_eq!(json["spec"]["serverless"]["cloud"], "aws");
        assert_eq!(json["spec"]["serverless"]["region"], "us-east-1");
    }

    #[test]
    fn test_list_response_pagination() {
        let body = r#"{
            "vectors": [{"id": "d1#chunk-0"}, {"id": "d1#chunk-1"}],
            "pagination": {"next": "token123"},
            "namespace": "farmer-rag"
        }"#;
        let response: ListVectorsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.vectors.len(), 2);
        assert_eq!(response.pagination.unwrap().next, "token123");

        let last_page: ListVectorsResponse =
            serde_json::from_str(r#"{"vectors": [{"id": "d1#chunk-2"}]}"#).unwrap();
        assert!(last_page.pagination.is_none());
    }

    #[test]
    fn test_stats_response_deserialization() {
        let body = r#"{
            "namespaces": {"farmer-rag": {"vectorCount": 42}},
            "dimension": 1024,
            "indexFullness": 0.0,
            "totalVectorCount": 50
        }"#;
        let response: DescribeStatsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.dimension, 1024);
        assert_eq!(response.total_vector_count, 50);
        assert_eq!(response.namespaces["farmer-rag"].vector_count, 42);
    }

    #[test]
    fn test_fetch_response_metadata_types() {
        let body = r#"{
            "vectors": {
                "d1#chunk-0": {
                    "id": "d1#chunk-0",
                    "values": [0.5, 0.5],
                    "metadata": {"doc_id": "d1", "chunk_index": 0, "draft": true}
                }
            }
        }"#;
        let response: FetchResponse = serde_json::from_str(body).unwrap();
        let record = &response.vectors["d1#chunk-0"];
        assert_eq!(record.metadata["doc_id"], MetadataValue::String("d1".into()));
        assert_eq!(record.metadata["chunk_index"], MetadataValue::Number(0.0));
        assert_eq!(record.metadata["draft"], MetadataValue::Bool(true));
    }
}
