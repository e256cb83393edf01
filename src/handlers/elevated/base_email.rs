// handlers/elevated/base_email.rs - POST /base-email handler

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::database::preferences;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, AppJson};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmailRegistration {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Registered {
    pub ok: bool,
    pub data: RegisteredEmail,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredEmail {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/**
 * POST /base-email - Register an email for base notifications
 *
 * Expected Input:
 * ```json
 * { "email": "Ops@Example.com" }
 * ```
 *
 * Emails are stored lower-cased. A new registration answers 201 with
 * `{ "ok": true, "data": { "id", "email", "createdAt" } }`; an email that is
 * already registered answers 200 `{ "message": "Email already exists" }`.
 */
pub async fn base_email_post(
    State(state): State<AppState>,
    AppJson(body): AppJson<EmailRegistration>,
) -> Result<Response, ApiError> {
    let email = body
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::validation_error("email is required"))?;

    match preferences::register(&state.pool, &email).await? {
        Some(row) => {
            tracing::info!("Registered notification email {}", row.email);
            Ok(ApiResponse::created(Registered {
                ok: true,
                data: RegisteredEmail {
                    id: row.id,
                    email: row.email,
                    created_at: row.created_at,
                },
            })
            .into_response())
        }
        None => Ok(ApiResponse::success(json!({ "message": "Email already exists" })).into_response()),
    }
}
