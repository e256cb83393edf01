use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Normalized reservation attributes, keyed by the external `reservation_no`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationRecord {
    pub reservation_no: String,
    pub base_id: Option<String>,
    pub reservation_name: Option<String>,
    pub customer_account_number: Option<String>,
    pub tail_number: Option<String>,
    pub status: Option<String>,
    pub reservation_type: Option<String>,
    pub est_arrival_at: Option<DateTime<Utc>>,
    pub act_arrival_at: Option<DateTime<Utc>>,
    pub est_departure_at: Option<DateTime<Utc>>,
    pub act_departure_at: Option<DateTime<Utc>>,
    pub fbo_name: Option<String>,
    pub res_created_date: Option<DateTime<Utc>>,
    pub flight_name: Option<String>,
    pub flight_model: Option<String>,
    pub flight_type: Option<String>,
}

/// Stored reservation as returned to clients.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRow {
    #[serde(skip)]
    pub id: Uuid,
    #[serde(rename = "reservationId")]
    pub reservation_no: String,
    pub base_id: Option<String>,
    pub reservation_name: Option<String>,
    pub customer_account_number: Option<String>,
    pub tail_number: Option<String>,
    pub status: Option<String>,
    pub reservation_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "estimatedArrival")]
    pub est_arrival_at: Option<DateTime<Utc>>,
    #[serde(rename = "actualArrival")]
    pub act_arrival_at: Option<DateTime<Utc>>,
    #[serde(rename = "estimatedDeparture")]
    pub est_departure_at: Option<DateTime<Utc>>,
    #[serde(rename = "actualDeparture")]
    pub act_departure_at: Option<DateTime<Utc>>,
    pub fbo_name: Option<String>,
    pub res_created_date: Option<DateTime<Utc>>,
    pub flight_name: Option<String>,
    pub flight_model: Option<String>,
    pub flight_type: Option<String>,
}
