use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::config::AdminConfig;
use crate::error::ApiError;
use crate::state::AppState;

pub const CLIENT_ID_HEADER: &str = "x-client-id";
pub const CLIENT_SECRET_HEADER: &str = "x-client-secret";

/// Shared-secret check for admin routes. Runs before method dispatch, so a
/// wrong method with bad credentials is still a 401. Preflight `OPTIONS`
/// passes untouched.
pub async fn admin_credentials_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    if !credentials_match(&state.config.admin, request.headers()) {
        tracing::warn!("Rejected admin request to {}: invalid client credentials", request.uri().path());
        return Err(ApiError::unauthorized("Unauthorized: Invalid client credentials"));
    }

    Ok(next.run(request).await)
}

fn credentials_match(admin: &AdminConfig, headers: &HeaderMap) -> bool {
    // Unset credentials lock the endpoint rather than opening it
    if admin.client_id.is_empty() || admin.client_secret.is_empty() {
        return false;
    }

    let presented = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or_default();

    let id_ok = presented(CLIENT_ID_HEADER).as_bytes().ct_eq(admin.client_id.as_bytes());
    let secret_ok = presented(CLIENT_SECRET_HEADER).as_bytes().ct_eq(admin.client_secret.as_bytes());
    bool::from(id_ok & secret_ok)
}
