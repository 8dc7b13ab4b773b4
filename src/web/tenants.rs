//! Tenant onboarding and usage reporting.

use crate::models::personalities::NewPersonality;
use crate::models::tenants::{NewTenant, TenantStatus};
use crate::personality::{industry_profile, pairs_to_json};
use crate::plans::Plan;
use crate::tenant;
use crate::usage;
use crate::{ApiError, AppState, DBConnection, DBError};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;
use validator::Validate;

const USAGE_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTenantRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 2, max = 63))]
    pub slug: String,
    #[validate(email)]
    #[serde(rename = "ownerEmail")]
    pub owner_email: String,
    #[serde(default, rename = "ownerName")]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TenantResponse {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub plan: String,
    pub status: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CheckSlugParams {
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub struct CheckSlugResponse {
    pub slug: String,
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct UsageEntry {
    pub day: NaiveDate,
    pub metric: String,
    pub count: i64,
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Onboarding: tenant + owner user + an industry-templated active
/// personality, so the assistant answers in character from the first message.
pub async fn create_tenant(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTenantRequest>,
) -> Result<Json<TenantResponse>, ApiError> {
    body.validate().map_err(|_| ApiError::ValidationFailed)?;

    let slug = body.slug.to_lowercase();
    if !is_valid_slug(&slug) {
        return Err(ApiError::ValidationFailed);
    }
    if state.db.slug_exists(&slug)? {
        return Err(ApiError::SlugTaken);
    }

    let tenant = state
        .db
        .create_tenant(
            NewTenant {
                uuid: Uuid::new_v4(),
                slug,
                name: body.name,
                plan: Plan::Free.as_str().to_string(),
                status: TenantStatus::Active.as_str().to_string(),
                settings: serde_json::json!({}),
                metadata: serde_json::json!({}),
            },
            body.owner_email,
            body.owner_name,
        )
        .map_err(|e| match e {
            DBError::Query(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            )) => ApiError::SlugTaken,
            other => ApiError::from(other),
        })?;

    let industry = body.industry.as_deref().unwrap_or("technology");
    let profile = industry_profile(industry, &tenant.name);
    let seeded = state.db.create_personality(NewPersonality {
        uuid: Uuid::new_v4(),
        tenant_id: tenant.id,
        name: profile.name,
        description: Some(profile.description),
        tone: profile.config.tone.as_str().to_string(),
        style: profile.config.style.as_str().to_string(),
        expertise: profile.config.expertise,
        philosophy: pairs_to_json(&profile.config.philosophy),
        core_values: pairs_to_json(&profile.config.values),
        brand_voice: profile.config.brand_voice,
        custom_prompt: None,
        response_length: profile.config.response_length.as_str().to_string(),
        language: profile.config.language,
        is_active: true,
    });
    if let Err(e) = seeded {
        // The tenant is still usable; the pipeline falls back to the default
        // profile until a personality is created.
        error!("Failed to seed personality for tenant {}: {e}", tenant.slug);
    }

    Ok(Json(TenantResponse {
        id: tenant.uuid,
        slug: tenant.slug,
        name: tenant.name,
        plan: tenant.plan,
        status: tenant.status,
        created_at: tenant.created_at,
    }))
}

pub async fn check_slug(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CheckSlugParams>,
) -> Result<Json<CheckSlugResponse>, ApiError> {
    let slug = params.slug.to_lowercase();
    let available = is_valid_slug(&slug) && !state.db.slug_exists(&slug)?;
    Ok(Json(CheckSlugResponse { slug, available }))
}

/// Last-30-days counters for the requesting tenant. The path id must match
/// the gateway-resolved tenant; cross-tenant reads 404.
pub async fn usage_stats(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(tenant_uuid): Path<Uuid>,
) -> Result<Json<Vec<UsageEntry>>, ApiError> {
    let signal = super::tenant_signal(&headers);
    let tenant = tenant::resolve(state.db.as_ref(), &signal)?;
    if tenant.uuid != tenant_uuid {
        return Err(ApiError::TenantNotFound);
    }

    let since = usage::today_utc() - Duration::days(USAGE_WINDOW_DAYS);
    let rows = state.db.usage_since(tenant.id, since)?;

    Ok(Json(
        rows.into_iter()
            .map(|row| UsageEntry {
                day: row.day,
                metric: row.metric,
                count: row.count,
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_charset_is_enforced() {
        assert!(is_valid_slug("acme"));
        assert!(is_valid_slug("acme-2"));
        assert!(!is_valid_slug("Acme"));
        assert!(!is_valid_slug("acme_inc"));
        assert!(!is_valid_slug("-acme"));
        assert!(!is_valid_slug("acme-"));
        assert!(!is_valid_slug("ac me"));
    }
}
