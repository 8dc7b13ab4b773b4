//! Provider seams for the external AI services.
//!
//! The orchestrator only sees these traits; production wires in the HTTP
//! clients, tests wire in fakes.

use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Failed to parse response: {0}")]
    ParseError(String),
    #[error("Service error: {0}")]
    ServiceError(String),
}

/// Text-to-vector embedding. Single attempt, bounded timeout; callers decide
/// how to degrade on failure.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;
}

/// Chat completion over a compiled system prompt and the user message.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct ScoredSnippet {
    pub content: String,
    pub score: f32,
}

/// Tenant-scoped nearest-neighbor index. Every query carries the tenant
/// scope; implementations must apply it server-side.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn query(
        &self,
        vector: &[f32],
        tenant_scope: Uuid,
        top_k: usize,
    ) -> Result<Vec<ScoredSnippet>, ProviderError>;

    async fn upsert(
        &self,
        id: &str,
        vector: &[f32],
        content: &str,
        tenant_scope: Uuid,
        metadata: serde_json::Value,
    ) -> Result<(), ProviderError>;

    async fn delete(&self, id: &str) -> Result<(), ProviderError>;
}
