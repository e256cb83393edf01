// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::services::consent::ConsentError;
use crate::services::pdf::RenderError;
use crate::services::reservation_feed::FeedError;

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// Detailed causes are logged where the error is converted; the response body
/// only ever carries the short message below.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    ValidationError(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed { allow: &'static str },

    // 409 Conflict
    Conflict(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 500 as well, but the cause lives in an upstream collaborator
    UpstreamError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UpstreamError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::MethodNotAllowed { .. } => "Method Not Allowed",
            ApiError::Conflict(msg) => msg,
            ApiError::PayloadTooLarge(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::UpstreamError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::UpstreamError(_) => "UPSTREAM_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation_error(message: impl Into<String>) -> Self {
        ApiError::ValidationError(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn method_not_allowed(allow: &'static str) -> Self {
        ApiError::MethodNotAllowed { allow }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn upstream_error(message: impl Into<String>) -> Self {
        ApiError::UpstreamError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut) => {
                tracing::error!("Database pool timed out");
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            other => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error("Server error")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::KeyDiscovery(_) => tracing::error!("JWT verification failed: {}", err),
            _ => tracing::warn!("JWT verification failed: {}", err),
        }
        match err {
            AuthError::Unauthenticated => ApiError::unauthorized("Missing or invalid Authorization header"),
            AuthError::Expired => ApiError::unauthorized("Token expired"),
            AuthError::InvalidSignatureOrClaims(_) | AuthError::KeyDiscovery(_) => {
                ApiError::unauthorized("Invalid or expired token")
            }
        }
    }
}

impl From<ConsentError> for ApiError {
    fn from(err: ConsentError) -> Self {
        match err {
            ConsentError::Validation(msg) => ApiError::validation_error(msg),
            ConsentError::PayloadTooLarge { .. } => ApiError::payload_too_large("Signature too large (max 2MB)"),
            ConsentError::Conflict => ApiError::conflict(
                "Consent already exists for this reservation. Use overwrite=true to replace.",
            ),
            ConsentError::Database(db) => db.into(),
        }
    }
}

impl From<FeedError> for ApiError {
    fn from(err: FeedError) -> Self {
        tracing::error!("Reservation feed error: {}", err);
        ApiError::upstream_error("Server error")
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        tracing::error!("PDF generation failed: {}", err);
        ApiError::upstream_error("Failed to generate PDF")
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        match rejection {
            JsonRejection::BytesRejection(_) => {
                ApiError::payload_too_large("Request body too large")
            }
            _ => ApiError::validation_error("Request body must be valid JSON"),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation_error(format!("Invalid query string: {}", rejection.body_text()))
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let mut response = (self.status_code(), Json(self.to_json())).into_response();
        if let ApiError::MethodNotAllowed { allow } = self {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(allow));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consent_conflict_maps_to_409_with_retry_hint() {
        let err: ApiError = ConsentError::Conflict.into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.message().starts_with("Consent already exists"));
        assert!(err.message().contains("overwrite=true"));
    }

    #[test]
    fn oversized_signature_maps_to_413() {
        let err: ApiError = ConsentError::PayloadTooLarge { size: 3 }.into();
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn auth_rejections_are_all_401() {
        for err in [
            AuthError::Unauthenticated,
            AuthError::Expired,
            AuthError::InvalidSignatureOrClaims("bad aud".into()),
            AuthError::KeyDiscovery("timeout".into()),
        ] {
            assert_eq!(ApiError::from(err).status_code(), StatusCode::UNAUTHORIZED);
        }
        assert_eq!(ApiError::from(AuthError::Expired).message(), "Token expired");
    }

    #[test]
    fn database_details_are_not_exposed() {
        let err: ApiError = DatabaseError::Sqlx(sqlx::Error::Protocol("secret detail".into())).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_json().to_string().contains("secret detail"));
    }

    #[test]
    fn method_not_allowed_sets_allow_header() {
        let response = ApiError::method_not_allowed("GET,OPTIONS").into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET,OPTIONS");
    }

    #[test]
    fn error_body_carries_message_and_code() {
        let body = ApiError::not_found("Reservation or consent not found").to_json();
        assert_eq!(body["error"], "Reservation or consent not found");
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
