//! The retrieval-augmented chat pipeline.
//!
//! One request walks: resolve tenant → check quota → embed query → search
//! context → compile prompt → generate completion → persist messages →
//! commit quota. Tenant and quota failures are terminal before anything is
//! charged; retrieval failures degrade to an ungrounded answer; only a
//! completion failure aborts after the quota check, and it leaves no state
//! behind.

use crate::db::{DBConnection, DBError};
use crate::models::conversations::{Conversation, NewConversation, STATUS_ACTIVE};
use crate::models::tenants::Tenant;
use crate::personality::PersonalityConfig;
use crate::plans::MetricType;
use crate::providers::{CompletionProvider, EmbeddingProvider, VectorIndex};
use crate::tenant::{self, ResolveError, TenantSignal};
use crate::usage;
use crate::AppState;
use thiserror::Error;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Substituted for the retrieved context when retrieval yields nothing,
/// whether because the tenant has no indexed documents or because a provider
/// failed. The model is instructed to say when context is missing.
pub const CONTEXT_FALLBACK: &str = "No specific company information available for this query.";

pub const DEFAULT_TOP_K: usize = 5;

const TITLE_MAX_CHARS: usize = 80;

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct ChatReply {
    pub response: String,
    pub conversation_id: Uuid,
    pub usage_current: i64,
    pub usage_limit: i64,
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Message is required")]
    MissingMessage,
    #[error("Tenant not found")]
    TenantNotFound,
    #[error("Tenant is not active")]
    TenantInactive,
    #[error("Usage limit reached")]
    QuotaExceeded { current: i64, limit: i64 },
    #[error("Failed to generate a response, please try again")]
    CompletionFailed,
    #[error("Internal error")]
    Internal,
}

impl From<ResolveError> for ChatError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound => ChatError::TenantNotFound,
            ResolveError::Inactive => ChatError::TenantInactive,
            ResolveError::Db(e) => {
                error!("Tenant resolution failed: {e}");
                ChatError::Internal
            }
        }
    }
}

pub async fn process_chat(
    state: &AppState,
    signal: &TenantSignal,
    user_id: Option<Uuid>,
    request: ChatRequest,
) -> Result<ChatReply, ChatError> {
    let message = request.message.trim().to_string();
    if message.is_empty() {
        return Err(ChatError::MissingMessage);
    }

    let db = state.db.as_ref();

    let tenant = tenant::resolve(db, signal)?;
    let user_id = verify_user(db, &tenant, user_id);

    let decision = usage::check(db, &tenant, MetricType::ApiCalls, 1).map_err(|e| {
        error!("Usage check failed for tenant {}: {e}", tenant.slug);
        ChatError::Internal
    })?;
    if !decision.allowed {
        return Err(ChatError::QuotaExceeded {
            current: decision.current,
            limit: decision.limit,
        });
    }

    let query_vector = match state.embeddings.embed(&message).await {
        Ok(vector) => Some(vector),
        Err(e) => {
            warn!(
                "Embedding unavailable for tenant {}, answering without retrieval: {e}",
                tenant.slug
            );
            None
        }
    };

    let snippets = retrieve_context(state, &tenant, query_vector.as_deref()).await;
    let context = if snippets.is_empty() {
        CONTEXT_FALLBACK.to_string()
    } else {
        snippets.join("\n\n")
    };

    let personality = match db.get_active_personality(tenant.id) {
        Ok(Some(row)) => PersonalityConfig::from_row(&row),
        Ok(None) => PersonalityConfig::default(),
        Err(e) => {
            error!("Failed to load personality for tenant {}: {e}", tenant.slug);
            PersonalityConfig::default()
        }
    };
    let system_prompt = personality.compile(&tenant.name, &context);

    let answer = state
        .completions
        .complete(&system_prompt, &message)
        .await
        .map_err(|e| {
            error!("Completion failed for tenant {}: {e}", tenant.slug);
            ChatError::CompletionFailed
        })?;

    // A persistence failure past this point must not take the answer down
    // with it; the completion already ran and the user gets it back.
    let conversation_id =
        match get_or_create_conversation(db, &tenant, user_id, request.conversation_id, &message) {
            Ok(conversation) => {
                if let Err(e) = db.append_message_pair(conversation.id, &message, &answer) {
                    error!(
                        "Failed to persist message pair for tenant {}: {e}",
                        tenant.slug
                    );
                }
                conversation.uuid
            }
            Err(e) => {
                error!(
                    "Failed to load or create conversation for tenant {}: {e}",
                    tenant.slug
                );
                request.conversation_id.unwrap_or_else(Uuid::new_v4)
            }
        };

    let usage_current = match usage::confirm(db, &tenant, MetricType::ApiCalls, 1) {
        Ok(count) => count,
        Err(e) => {
            error!("Failed to commit usage for tenant {}: {e}", tenant.slug);
            decision.current + 1
        }
    };

    Ok(ChatReply {
        response: answer,
        conversation_id,
        usage_current,
        usage_limit: decision.limit,
    })
}

async fn retrieve_context(
    state: &AppState,
    tenant: &Tenant,
    query_vector: Option<&[f32]>,
) -> Vec<String> {
    let Some(vector) = query_vector else {
        return Vec::new();
    };
    let Some(index) = &state.vector_index else {
        debug!("Vector index not configured, skipping retrieval");
        return Vec::new();
    };

    match index.query(vector, tenant.uuid, DEFAULT_TOP_K).await {
        Ok(matches) => {
            debug!(
                "Retrieved {} snippets for tenant {} (top score {:.3})",
                matches.len(),
                tenant.slug,
                matches.first().map(|m| m.score).unwrap_or(0.0)
            );
            matches
                .into_iter()
                .map(|m| m.content)
                .filter(|content| !content.is_empty())
                .collect()
        }
        Err(e) => {
            warn!("Vector search unavailable for tenant {}: {e}", tenant.slug);
            Vec::new()
        }
    }
}

/// The gateway's user header is only trusted as far as the user actually
/// belonging to the resolved tenant; anything else records the conversation
/// without attribution.
fn verify_user(db: &dyn DBConnection, tenant: &Tenant, user_id: Option<Uuid>) -> Option<Uuid> {
    let candidate = user_id?;
    match db.get_active_user(candidate, tenant.id) {
        Ok(Some(user)) => Some(user.uuid),
        Ok(None) => {
            debug!(
                "User {} is not active in tenant {}, recording without attribution",
                candidate, tenant.slug
            );
            None
        }
        Err(e) => {
            warn!("User lookup failed for tenant {}: {e}", tenant.slug);
            None
        }
    }
}

/// Reuse the requested conversation only if it belongs to the requesting
/// tenant and is still active; anything else silently gets a fresh one, so a
/// guessed or stale id can never append into a foreign transcript.
fn get_or_create_conversation(
    db: &dyn DBConnection,
    tenant: &Tenant,
    user_id: Option<Uuid>,
    requested: Option<Uuid>,
    first_message: &str,
) -> Result<Conversation, DBError> {
    if let Some(conversation_uuid) = requested {
        match db.get_conversation_by_uuid(conversation_uuid)? {
            Some(existing) if existing.tenant_id == tenant.id && existing.is_active() => {
                return Ok(existing);
            }
            Some(_) => {
                debug!(
                    "Requested conversation {} not reusable for tenant {}, creating a new one",
                    conversation_uuid, tenant.slug
                );
            }
            None => {
                debug!(
                    "Requested conversation {} not found, creating a new one",
                    conversation_uuid
                );
            }
        }
    }

    db.create_conversation(NewConversation {
        uuid: Uuid::new_v4(),
        tenant_id: tenant.id,
        user_id,
        title: Some(derive_title(first_message)),
        status: STATUS_ACTIVE.to_string(),
    })
}

fn derive_title(message: &str) -> String {
    message.trim().chars().take(TITLE_MAX_CHARS).collect()
}
