//! Personality management: list, create, activate, delete.
//!
//! Creating or activating a personality deactivates its siblings; deleting
//! the active one is rejected so a tenant always keeps exactly one.

use crate::models::personalities::{NewPersonality, Personality};
use crate::personality::{pairs_from_json, pairs_to_json, ResponseLength, Style, Tone};
use crate::tenant;
use crate::{ApiError, AppState, DBConnection};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePersonalityRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[serde(default)]
    pub philosophy: Vec<(String, String)>,
    #[serde(default)]
    pub values: Vec<(String, String)>,
    #[serde(default, rename = "brandVoice")]
    pub brand_voice: Option<String>,
    #[serde(default, rename = "customPrompt")]
    pub custom_prompt: Option<String>,
    #[serde(default, rename = "responseLength")]
    pub response_length: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonalityView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub tone: String,
    pub style: String,
    pub expertise: Vec<String>,
    pub philosophy: Vec<(String, String)>,
    pub values: Vec<(String, String)>,
    #[serde(rename = "brandVoice")]
    pub brand_voice: Option<String>,
    #[serde(rename = "customPrompt")]
    pub custom_prompt: Option<String>,
    #[serde(rename = "responseLength")]
    pub response_length: String,
    pub language: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<&Personality> for PersonalityView {
    fn from(row: &Personality) -> Self {
        PersonalityView {
            id: row.uuid,
            name: row.name.clone(),
            description: row.description.clone(),
            tone: row.tone.clone(),
            style: row.style.clone(),
            expertise: row.expertise.clone(),
            philosophy: pairs_from_json(&row.philosophy),
            values: pairs_from_json(&row.core_values),
            brand_voice: row.brand_voice.clone(),
            custom_prompt: row.custom_prompt.clone(),
            response_length: row.response_length.clone(),
            language: row.language.clone(),
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedPersonalityResponse {
    pub id: Uuid,
    pub deleted: bool,
}

pub async fn list_personalities(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<PersonalityView>>, ApiError> {
    let signal = super::tenant_signal(&headers);
    let tenant = tenant::resolve(state.db.as_ref(), &signal)?;

    let rows = state.db.list_personalities(tenant.id)?;
    Ok(Json(rows.iter().map(PersonalityView::from).collect()))
}

pub async fn create_personality(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreatePersonalityRequest>,
) -> Result<Json<PersonalityView>, ApiError> {
    let signal = super::tenant_signal(&headers);
    let tenant = tenant::resolve(state.db.as_ref(), &signal)?;

    body.validate().map_err(|_| ApiError::ValidationFailed)?;

    // Closed option sets: unknown tone/style/length values are rejected, not
    // silently coerced.
    let tone = match body.tone.as_deref() {
        Some(value) => Tone::parse(value).ok_or(ApiError::ValidationFailed)?,
        None => Tone::default(),
    };
    let style = match body.style.as_deref() {
        Some(value) => Style::parse(value).ok_or(ApiError::ValidationFailed)?,
        None => Style::default(),
    };
    let response_length = match body.response_length.as_deref() {
        Some(value) => ResponseLength::parse(value).ok_or(ApiError::ValidationFailed)?,
        None => ResponseLength::default(),
    };

    let expertise = if body.expertise.is_empty() {
        vec!["general".to_string()]
    } else {
        body.expertise
    };

    let created = state.db.create_personality(NewPersonality {
        uuid: Uuid::new_v4(),
        tenant_id: tenant.id,
        name: body.name,
        description: body.description,
        tone: tone.as_str().to_string(),
        style: style.as_str().to_string(),
        expertise,
        philosophy: pairs_to_json(&body.philosophy),
        core_values: pairs_to_json(&body.values),
        brand_voice: body.brand_voice.filter(|v| !v.is_empty()),
        custom_prompt: body.custom_prompt.filter(|v| !v.is_empty()),
        response_length: response_length.as_str().to_string(),
        language: body.language.unwrap_or_else(|| "en".to_string()),
        is_active: true,
    })?;

    Ok(Json(PersonalityView::from(&created)))
}

pub async fn activate_personality(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(personality_uuid): Path<Uuid>,
) -> Result<Json<PersonalityView>, ApiError> {
    let signal = super::tenant_signal(&headers);
    let tenant = tenant::resolve(state.db.as_ref(), &signal)?;

    let activated = state
        .db
        .activate_personality(personality_uuid, tenant.id)?;
    Ok(Json(PersonalityView::from(&activated)))
}

pub async fn delete_personality(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(personality_uuid): Path<Uuid>,
) -> Result<Json<DeletedPersonalityResponse>, ApiError> {
    let signal = super::tenant_signal(&headers);
    let tenant = tenant::resolve(state.db.as_ref(), &signal)?;

    state.db.delete_personality(personality_uuid, tenant.id)?;
    Ok(Json(DeletedPersonalityResponse {
        id: personality_uuid,
        deleted: true,
    }))
}
