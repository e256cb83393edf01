use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Channel tag recorded on every consent captured through this API.
pub const CONSENT_CHANNEL: &str = "Mobile App";

/// Validated consent ready to be written. The signature is already decoded
/// and size-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsentDraft {
    pub full_name: String,
    pub terms_text: String,
    pub terms_version: String,
    pub geo_location: Option<String>,
    pub signature: Vec<u8>,
}

/// What a consent write hands back. Never carries the signature bytes.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
    pub id: Uuid,
    pub terms_version: String,
    pub geo_location: Option<String>,
    pub channel: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full stored consent. `signature_image` is only selected when the caller
/// asked for it.
#[derive(Debug, Clone, FromRow)]
pub struct ConsentRow {
    pub id: Uuid,
    pub full_name: String,
    pub terms_version: String,
    pub terms_and_conditions: String,
    pub geo_location: Option<String>,
    pub channel: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub signature_image: Option<Vec<u8>>,
}

/// Consent looked up by external reservation number, for merging into
/// upstream feed results.
#[derive(Debug, Clone, FromRow)]
pub struct StoredConsent {
    pub reservation_no: String,
    pub full_name: String,
    pub terms_version: String,
    pub geo_location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub signature_image: Vec<u8>,
}
