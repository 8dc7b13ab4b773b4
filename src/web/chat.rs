//! The chat endpoint, a thin shell over the RAG pipeline.

use crate::rag::{self, ChatRequest};
use crate::{ApiError, AppState};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "conversationId")]
    pub conversation_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponseBody {
    pub response: String,
    #[serde(rename = "conversationId")]
    pub conversation_id: Uuid,
    pub usage: UsageBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageBody {
    pub current: i64,
    pub limit: i64,
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let signal = super::tenant_signal(&headers);
    let user_id = super::user_id(&headers);

    let reply = rag::process_chat(
        &state,
        &signal,
        user_id,
        ChatRequest {
            message: body.message,
            conversation_id: body.conversation_id,
        },
    )
    .await?;

    Ok(Json(ChatResponseBody {
        response: reply.response,
        conversation_id: reply.conversation_id,
        usage: UsageBody {
            current: reply.usage_current,
            limit: reply.usage_limit,
        },
    }))
}
