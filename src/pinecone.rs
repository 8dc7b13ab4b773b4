//! Vector index client.
//!
//! Every query carries a server-side tenant filter; omitting it would leak
//! one tenant's documents into another tenant's answers.

use crate::providers::{ProviderError, ScoredSnippet, VectorIndex};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    #[serde(default)]
    score: f32,
    metadata: Option<serde_json::Value>,
}

#[derive(Clone)]
pub struct PineconeClient {
    client: Client,
    api_key: String,
    index_host: String,
}

impl PineconeClient {
    pub fn new(api_key: String, index_host: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key,
            index_host,
        }
    }

    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(format!("{}{}", self.index_host, path))
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(ProviderError::ServiceError(format!("{status}: {detail}")))
        }
    }
}

#[async_trait]
impl VectorIndex for PineconeClient {
    async fn query(
        &self,
        vector: &[f32],
        tenant_scope: Uuid,
        top_k: usize,
    ) -> Result<Vec<ScoredSnippet>, ProviderError> {
        let body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
            "filter": {"tenant_id": {"$eq": tenant_scope.to_string()}},
        });

        let parsed: QueryResponse = self
            .post_json("/query", body)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        Ok(parsed
            .matches
            .into_iter()
            .filter_map(|m| {
                let content = m
                    .metadata
                    .as_ref()
                    .and_then(|meta| meta.get("content"))
                    .and_then(|c| c.as_str())?
                    .to_string();
                if content.is_empty() {
                    return None;
                }
                Some(ScoredSnippet {
                    content,
                    score: m.score,
                })
            })
            .collect())
    }

    async fn upsert(
        &self,
        id: &str,
        vector: &[f32],
        content: &str,
        tenant_scope: Uuid,
        metadata: serde_json::Value,
    ) -> Result<(), ProviderError> {
        let mut full_metadata = json!({
            "content": content,
            "tenant_id": tenant_scope.to_string(),
        });
        if let (Some(target), Some(extra)) = (full_metadata.as_object_mut(), metadata.as_object()) {
            for (key, value) in extra {
                target.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }

        let body = json!({
            "vectors": [{
                "id": id,
                "values": vector,
                "metadata": full_metadata,
            }],
        });

        self.post_json("/vectors/upsert", body).await.map(|_| ())
    }

    async fn delete(&self, id: &str) -> Result<(), ProviderError> {
        let body = json!({"ids": [id]});
        self.post_json("/vectors/delete", body).await.map(|_| ())
    }
}
