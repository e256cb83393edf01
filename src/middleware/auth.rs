use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthError, Claims};
use crate::error::ApiError;
use crate::state::AppState;

/// Verified claims of the caller, inserted by `jwt_auth_middleware`
#[derive(Clone, Debug)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::from(AuthError::Unauthenticated))
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers())?.to_string();
    let claims = state.verifier.verify(&token).await?;

    tracing::debug!(
        "Authenticated request as {}",
        claims.acting_email().or_else(|| claims.sub.clone()).unwrap_or_default()
    );

    request.extensions_mut().insert(AuthUser(claims));
    Ok(next.run(request).await)
}

/// Token from an `Authorization: Bearer <token>` header
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::Unauthenticated)?
        .to_str()
        .map_err(|_| AuthError::Unauthenticated)?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::Unauthenticated)?;

    if token.is_empty() {
        return Err(AuthError::Unauthenticated);
    }
    Ok(token)
}
