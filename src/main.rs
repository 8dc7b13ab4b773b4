mod config;
mod db;
mod ingest;
mod models;
mod openai;
mod personality;
mod pinecone;
mod plans;
mod providers;
mod rag;
mod tenant;
mod usage;
mod web;

pub use db::{DBConnection, DBError};

use crate::config::Config;
use crate::db::PostgresConnection;
use crate::ingest::IngestError;
use crate::openai::OpenAiClient;
use crate::pinecone::PineconeClient;
use crate::providers::{CompletionProvider, EmbeddingProvider, VectorIndex};
use crate::rag::ChatError;
use crate::tenant::ResolveError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Tenant not found")]
    TenantNotFound,

    #[error("Tenant is not active")]
    TenantInactive,

    #[error("Usage limit reached")]
    QuotaExceeded,

    #[error("Message is required")]
    MissingMessage,

    #[error("Failed to generate a response, please try again")]
    CompletionFailed,

    #[error("Validation failed")]
    ValidationFailed,

    #[error("Slug is already taken")]
    SlugTaken,

    #[error("Cannot delete the active personality")]
    LastActivePersonality,

    #[error("Resource not found")]
    NotFound,

    #[error("Internal server error")]
    InternalServerError,
}

impl ApiError {
    /// Stable machine-readable code surfaced alongside the human message.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::TenantNotFound => "tenant_not_found",
            ApiError::TenantInactive => "tenant_inactive",
            ApiError::QuotaExceeded => "quota_exceeded",
            ApiError::MissingMessage => "missing_message",
            ApiError::CompletionFailed => "completion_failed",
            ApiError::ValidationFailed => "validation_failed",
            ApiError::SlugTaken => "slug_taken",
            ApiError::LastActivePersonality => "last_active_personality",
            ApiError::NotFound => "not_found",
            ApiError::InternalServerError => "internal_error",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            ApiError::TenantNotFound => StatusCode::NOT_FOUND,
            ApiError::TenantInactive => StatusCode::FORBIDDEN,
            ApiError::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            ApiError::MissingMessage => StatusCode::BAD_REQUEST,
            ApiError::CompletionFailed => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ValidationFailed => StatusCode::BAD_REQUEST,
            ApiError::SlugTaken => StatusCode::CONFLICT,
            ApiError::LastActivePersonality => StatusCode::CONFLICT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorResponse {
                code: self.code(),
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<DBError> for ApiError {
    fn from(err: DBError) -> Self {
        match err {
            DBError::NotFound => ApiError::NotFound,
            DBError::ActivePersonalityDelete => ApiError::LastActivePersonality,
            other => {
                error!("Database error: {other}");
                ApiError::InternalServerError
            }
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotFound => ApiError::TenantNotFound,
            ResolveError::Inactive => ApiError::TenantInactive,
            ResolveError::Db(e) => {
                error!("Tenant resolution failed: {e}");
                ApiError::InternalServerError
            }
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::MissingMessage => ApiError::MissingMessage,
            ChatError::TenantNotFound => ApiError::TenantNotFound,
            ChatError::TenantInactive => ApiError::TenantInactive,
            ChatError::QuotaExceeded { .. } => ApiError::QuotaExceeded,
            ChatError::CompletionFailed => ApiError::CompletionFailed,
            ChatError::Internal => ApiError::InternalServerError,
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::QuotaExceeded { .. } => ApiError::QuotaExceeded,
            IngestError::EmbeddingFailed => ApiError::InternalServerError,
            IngestError::Db(e) => ApiError::from(e),
        }
    }
}

/// Explicitly constructed service handles; tests substitute fakes through
/// the same fields.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DBConnection>,
    pub embeddings: Arc<dyn EmbeddingProvider>,
    pub completions: Arc<dyn CompletionProvider>,
    pub vector_index: Option<Arc<dyn VectorIndex>>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solveur=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let db = PostgresConnection::new(&config.database_url)?;

    let openai = Arc::new(OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    ));

    let vector_index: Option<Arc<dyn VectorIndex>> =
        match (&config.pinecone_api_key, &config.pinecone_index_host) {
            (Some(api_key), Some(host)) => {
                Some(Arc::new(PineconeClient::new(api_key.clone(), host.clone())))
            }
            _ => {
                warn!("Vector index not configured, retrieval is disabled");
                None
            }
        };

    let state = Arc::new(AppState {
        db: Arc::new(db),
        embeddings: openai.clone(),
        completions: openai,
        vector_index,
    });

    let app = web::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Solveur listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
