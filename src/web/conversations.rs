//! Conversation transcript and lifecycle endpoints.

use crate::models::conversations::Message;
use crate::tenant;
use crate::{ApiError, AppState, DBConnection};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub id: Uuid,
    pub role: String,
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for MessageView {
    fn from(row: &Message) -> Self {
        MessageView {
            id: row.uuid,
            role: row.role.clone(),
            content: row.content.clone(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationView {
    pub id: Uuid,
    pub title: Option<String>,
    pub status: String,
    pub messages: Vec<MessageView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClosedConversationResponse {
    pub id: Uuid,
    pub status: String,
}

pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(conversation_uuid): Path<Uuid>,
) -> Result<Json<ConversationView>, ApiError> {
    let signal = super::tenant_signal(&headers);
    let tenant = tenant::resolve(state.db.as_ref(), &signal)?;

    let conversation = state
        .db
        .get_conversation_by_uuid(conversation_uuid)?
        .filter(|c| c.tenant_id == tenant.id)
        .ok_or(ApiError::NotFound)?;

    let messages = state.db.list_messages(conversation.id)?;

    Ok(Json(ConversationView {
        id: conversation.uuid,
        title: conversation.title,
        status: conversation.status,
        messages: messages.iter().map(MessageView::from).collect(),
    }))
}

pub async fn close_conversation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(conversation_uuid): Path<Uuid>,
) -> Result<Json<ClosedConversationResponse>, ApiError> {
    let signal = super::tenant_signal(&headers);
    let tenant = tenant::resolve(state.db.as_ref(), &signal)?;

    let conversation = state
        .db
        .get_conversation_by_uuid(conversation_uuid)?
        .filter(|c| c.tenant_id == tenant.id)
        .ok_or(ApiError::NotFound)?;

    state.db.close_conversation(conversation.id)?;

    Ok(Json(ClosedConversationResponse {
        id: conversation.uuid,
        status: crate::models::conversations::STATUS_CLOSED.to_string(),
    }))
}
