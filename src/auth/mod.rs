use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::AuthConfig;

pub mod jwks;

pub use jwks::{HttpKeySource, JwksCache, KeySource, StaticKeySource};

/// Claim set of a verified bearer token.
///
/// The well-known claims are lifted into fields; everything else the issuer
/// put in the token is preserved in `extra` so the set round-trips verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Email of the acting user: `preferred_username` first, then `email`,
    /// lower-cased.
    pub fn acting_email(&self) -> Option<String> {
        [&self.preferred_username, &self.email]
            .into_iter()
            .flatten()
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .map(|v| v.to_lowercase())
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing or malformed Authorization header")]
    Unauthenticated,

    #[error("token expired")]
    Expired,

    #[error("invalid signature or claims: {0}")]
    InvalidSignatureOrClaims(String),

    #[error("signing key discovery failed: {0}")]
    KeyDiscovery(String),
}

/// Verifies RS256 bearer tokens against the issuer's published keys.
pub struct ClaimsVerifier {
    keys: JwksCache,
    validation: Validation,
}

impl ClaimsVerifier {
    pub fn new(config: &AuthConfig, source: Arc<dyn KeySource>) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_issuer(&[config.issuer.as_str()]);

        Self {
            keys: JwksCache::new(source, Duration::from_secs(config.jwks_cache_secs)),
            validation,
        }
    }

    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidSignatureOrClaims(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidSignatureOrClaims("token header has no kid".to_string()))?;

        let key = self.keys.decoding_key(&kid).await?;

        decode::<Claims>(token, &key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidSignatureOrClaims(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn acting_email_prefers_preferred_username() {
        let claims: Claims = serde_json::from_value(json!({
            "exp": 1,
            "email": "other@example.com",
            "preferred_username": " Ops.Lead@Example.com ",
        }))
        .unwrap();
        assert_eq!(claims.acting_email().as_deref(), Some("ops.lead@example.com"));
    }

    #[test]
    fn acting_email_falls_back_to_email() {
        let claims: Claims = serde_json::from_value(json!({
            "exp": 1,
            "preferred_username": "",
            "email": "crew@example.com",
        }))
        .unwrap();
        assert_eq!(claims.acting_email().as_deref(), Some("crew@example.com"));
    }

    #[test]
    fn unknown_claims_are_preserved() {
        let raw = json!({ "exp": 10, "sub": "abc", "tid": "tenant", "roles": ["Ops"] });
        let claims: Claims = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(claims.extra["tid"], "tenant");
        assert_eq!(serde_json::to_value(&claims).unwrap(), raw);
    }
}
