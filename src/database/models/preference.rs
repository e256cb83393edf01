use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct EmailPreference {
    pub id: Uuid,
    pub email: String,
    pub base_preference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmailPreference {
    /// Base codes in subscription order, trimmed, without empty entries.
    pub fn base_codes(&self) -> Vec<String> {
        split_base_codes(self.base_preference.as_deref().unwrap_or_default())
    }
}

pub fn split_base_codes(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_base_codes(codes: &[String]) -> String {
    codes
        .iter()
        .map(|code| code.trim())
        .filter(|code| !code.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}
