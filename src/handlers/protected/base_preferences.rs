// handlers/protected/base_preferences.rs - GET/POST /base-preferences handlers

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::Claims;
use crate::database::models::preference::{join_base_codes, split_base_codes};
use crate::database::preferences;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AppJson, AuthUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasePreferences {
    pub email: String,
    pub base_preferences: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PreferencesUpdated {
    pub ok: bool,
    pub data: BasePreferences,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferencesUpdate {
    pub base_preferences: Value,
}

fn acting_email(claims: &Claims) -> Result<String, ApiError> {
    claims
        .acting_email()
        .ok_or_else(|| ApiError::validation_error("User email not found in token"))
}

/// Base codes from a JSON array of strings
fn parse_base_codes(value: &Value) -> Result<Vec<String>, ApiError> {
    let Value::Array(items) = value else {
        return Err(ApiError::validation_error("basePreferences must be an array"));
    };
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| ApiError::validation_error("basePreferences must be an array of strings"))
        })
        .collect()
}

/// GET /base-preferences - the caller's subscribed base codes
pub async fn base_preferences_get(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<BasePreferences> {
    let email = acting_email(&claims)?;

    let preference = preferences::find(&state.pool, &email)
        .await?
        .ok_or_else(|| ApiError::not_found("Email not found or not configured"))?;

    Ok(ApiResponse::success(BasePreferences {
        base_preferences: preference.base_codes(),
        email: preference.email,
        updated_at: preference.updated_at,
    }))
}

/**
 * POST /base-preferences - Replace the caller's subscribed base codes
 *
 * Expected Input:
 * ```json
 * { "basePreferences": ["LAS", "TEB"] }
 * ```
 *
 * The email must already be registered through POST /base-email.
 */
pub async fn base_preferences_post(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AppJson(update): AppJson<PreferencesUpdate>,
) -> ApiResult<PreferencesUpdated> {
    let email = acting_email(&claims)?;
    let codes = parse_base_codes(&update.base_preferences)?;
    let csv = join_base_codes(&codes);

    let preference = preferences::update(&state.pool, &email, &csv)
        .await?
        .ok_or_else(|| ApiError::not_found("Email not found. Contact admin to add your email first."))?;

    tracing::info!("Updated base preferences for {}: [{}]", preference.email, csv);

    Ok(ApiResponse::success(PreferencesUpdated {
        ok: true,
        data: BasePreferences {
            email: preference.email,
            base_preferences: split_base_codes(&csv),
            updated_at: preference.updated_at,
        },
    }))
}
