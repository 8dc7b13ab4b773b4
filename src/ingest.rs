//! Knowledge-base document ingestion: embed the content, upsert it into the
//! tenant-scoped vector index, and track the document's lifecycle.

use crate::db::{DBConnection, DBError};
use crate::models::documents::{Document, NewDocument, STATUS_PENDING};
use crate::models::tenants::Tenant;
use crate::plans::MetricType;
use crate::providers::{EmbeddingProvider, VectorIndex};
use crate::usage;
use crate::AppState;
use thiserror::Error;
use tracing::{debug, error, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Usage limit reached")]
    QuotaExceeded { current: i64, limit: i64 },
    #[error("Failed to embed document content")]
    EmbeddingFailed,
    #[error(transparent)]
    Db(#[from] DBError),
}

pub async fn ingest_document(
    state: &AppState,
    tenant: &Tenant,
    title: &str,
    content: &str,
) -> Result<Document, IngestError> {
    let db = state.db.as_ref();

    let decision = usage::check(db, tenant, MetricType::Documents, 1)?;
    if !decision.allowed {
        return Err(IngestError::QuotaExceeded {
            current: decision.current,
            limit: decision.limit,
        });
    }

    let document = db.create_document(NewDocument {
        uuid: Uuid::new_v4(),
        tenant_id: tenant.id,
        title: title.to_string(),
        content: content.to_string(),
        vector_id: None,
        status: STATUS_PENDING.to_string(),
    })?;

    let vector = match state.embeddings.embed(content).await {
        Ok(vector) => vector,
        Err(e) => {
            error!(
                "Embedding failed for document {} of tenant {}: {e}",
                document.uuid, tenant.slug
            );
            db.mark_document_failed(document.id)?;
            return Err(IngestError::EmbeddingFailed);
        }
    };

    // An index outage degrades retrieval quality, not ingestion; the content
    // and its status stay in the relational store either way.
    let vector_id = document.uuid.to_string();
    match &state.vector_index {
        Some(index) => {
            let metadata = serde_json::json!({"title": title});
            if let Err(e) = index
                .upsert(&vector_id, &vector, content, tenant.uuid, metadata)
                .await
            {
                warn!(
                    "Vector upsert failed for document {} of tenant {}: {e}",
                    document.uuid, tenant.slug
                );
            }
        }
        None => debug!("Vector index not configured, skipping upsert"),
    }

    db.mark_document_indexed(document.id, &vector_id)?;
    usage::confirm(db, tenant, MetricType::Documents, 1)?;

    db.get_document(document.uuid, tenant.id)?
        .ok_or(IngestError::Db(DBError::NotFound))
}
