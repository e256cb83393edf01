use serde::Serialize;
use sqlx::FromRow;

/// Reference record for a physical service location. Serialized with column
/// names, which is what the base listing has always returned.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct BaseMapping {
    pub base_id: String,
    pub company_code: Option<String>,
    pub base_number: Option<String>,
    pub iata: Option<String>,
    pub icao: Option<String>,
    pub region: Option<String>,
    pub business_division: Option<String>,
    pub base_description: Option<String>,
    pub fbo_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub active: Option<bool>,
    pub currency_code: Option<String>,
    pub default_units: Option<String>,
    pub base_country: Option<String>,
    pub base_time_zone: Option<String>,
}
