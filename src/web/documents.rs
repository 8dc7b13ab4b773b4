//! Knowledge-base document endpoints.

use crate::ingest;
use crate::models::documents::Document;
use crate::providers::VectorIndex;
use crate::tenant;
use crate::{ApiError, AppState, DBConnection};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDocumentRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub status: String,
    #[serde(rename = "vectorId")]
    pub vector_id: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<&Document> for DocumentView {
    fn from(row: &Document) -> Self {
        DocumentView {
            id: row.uuid,
            title: row.title.clone(),
            content: row.content.clone(),
            status: row.status.clone(),
            vector_id: row.vector_id.clone(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedDocumentResponse {
    pub id: Uuid,
    pub deleted: bool,
}

pub async fn create_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateDocumentRequest>,
) -> Result<Json<DocumentView>, ApiError> {
    let signal = super::tenant_signal(&headers);
    let tenant = tenant::resolve(state.db.as_ref(), &signal)?;

    body.validate().map_err(|_| ApiError::ValidationFailed)?;

    let document = ingest::ingest_document(&state, &tenant, &body.title, &body.content).await?;
    Ok(Json(DocumentView::from(&document)))
}

pub async fn get_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(document_uuid): Path<Uuid>,
) -> Result<Json<DocumentView>, ApiError> {
    let signal = super::tenant_signal(&headers);
    let tenant = tenant::resolve(state.db.as_ref(), &signal)?;

    let document = state
        .db
        .get_document(document_uuid, tenant.id)?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(DocumentView::from(&document)))
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(document_uuid): Path<Uuid>,
) -> Result<Json<DeletedDocumentResponse>, ApiError> {
    let signal = super::tenant_signal(&headers);
    let tenant = tenant::resolve(state.db.as_ref(), &signal)?;

    let document = state
        .db
        .get_document(document_uuid, tenant.id)?
        .ok_or(ApiError::NotFound)?;

    if !state.db.delete_document(document_uuid, tenant.id)? {
        return Err(ApiError::NotFound);
    }

    if let (Some(index), Some(vector_id)) = (&state.vector_index, document.vector_id) {
        if let Err(e) = index.delete(&vector_id).await {
            warn!(
                "Failed to remove vector {} for deleted document {}: {e}",
                vector_id, document_uuid
            );
        }
    }

    Ok(Json(DeletedDocumentResponse {
        id: document_uuid,
        deleted: true,
    }))
}
