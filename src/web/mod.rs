//! HTTP surface: routers plus trusted-header identity extraction.
//!
//! Tenant and user identity arrive as headers injected by the upstream
//! gateway; nothing here authenticates, it only reads what the gateway
//! already verified.

pub mod chat;
pub mod conversations;
pub mod documents;
pub mod health;
pub mod personalities;
pub mod tenants;

use crate::tenant::TenantSignal;
use crate::AppState;
use axum::http::HeaderMap;
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

pub const HEADER_TENANT_ID: &str = "x-tenant-id";
pub const HEADER_TENANT_SLUG: &str = "x-tenant-slug";
pub const HEADER_USER_ID: &str = "x-user-id";

pub fn tenant_signal(headers: &HeaderMap) -> TenantSignal {
    TenantSignal {
        tenant_id: header_str(headers, HEADER_TENANT_ID).and_then(|v| Uuid::parse_str(v).ok()),
        slug: header_str(headers, HEADER_TENANT_SLUG).map(|v| v.to_string()),
    }
}

pub fn user_id(headers: &HeaderMap) -> Option<Uuid> {
    header_str(headers, HEADER_USER_ID).and_then(|v| Uuid::parse_str(v).ok())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/chat", post(chat::chat))
        .route(
            "/conversations/:conversation_uuid",
            get(conversations::get_conversation),
        )
        .route(
            "/conversations/:conversation_uuid/close",
            post(conversations::close_conversation),
        )
        .route("/tenants", post(tenants::create_tenant))
        .route("/tenants/check-slug", get(tenants::check_slug))
        .route("/tenants/:tenant_uuid/usage", get(tenants::usage_stats))
        .route(
            "/personalities",
            get(personalities::list_personalities).post(personalities::create_personality),
        )
        .route(
            "/personalities/:personality_uuid/activate",
            post(personalities::activate_personality),
        )
        .route(
            "/personalities/:personality_uuid",
            delete(personalities::delete_personality),
        )
        .route("/documents", post(documents::create_document))
        .route(
            "/documents/:document_uuid",
            get(documents::get_document).delete(documents::delete_document),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn tenant_signal_parses_both_headers() {
        let tenant_uuid = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            HEADER_TENANT_ID,
            HeaderValue::from_str(&tenant_uuid.to_string()).unwrap(),
        );
        headers.insert(HEADER_TENANT_SLUG, HeaderValue::from_static("acme"));

        let signal = tenant_signal(&headers);
        assert_eq!(signal.tenant_id, Some(tenant_uuid));
        assert_eq!(signal.slug.as_deref(), Some("acme"));
    }

    #[test]
    fn malformed_tenant_id_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_TENANT_ID, HeaderValue::from_static("not-a-uuid"));

        let signal = tenant_signal(&headers);
        assert_eq!(signal.tenant_id, None);
    }

    #[test]
    fn empty_headers_produce_an_empty_signal() {
        let signal = tenant_signal(&HeaderMap::new());
        assert!(signal.tenant_id.is_none());
        assert!(signal.slug.is_none());
        assert!(user_id(&HeaderMap::new()).is_none());
    }
}
