use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One service line to be stored under a reservation. Defaults for quantity
/// and price are applied during normalization, so every field here is final.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceLine {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub product_status: Option<String>,
    pub quantity: i32,
    pub service_date: Option<DateTime<Utc>>,
    pub subcase_id: Option<String>,
    pub for_arrival_or_departure: Option<String>,
    pub dsf_product_name: Option<String>,
    pub service_request_details: Option<String>,
    pub vendor_name: Option<String>,
    pub on_arrival: bool,
    pub on_departure: bool,
    pub phone_number: Option<String>,
    pub email_address: Option<String>,
    pub quoted_price: Decimal,
    pub special_instruction_value: Option<String>,
    pub vendor_rep: Option<String>,
    pub crew_meal_count: Option<i32>,
    pub pax_meal_count: Option<i32>,
    pub crew_or_passenger: Option<String>,
}

impl Default for ServiceLine {
    fn default() -> Self {
        Self {
            product_id: None,
            product_name: None,
            product_status: None,
            quantity: 1,
            service_date: None,
            subcase_id: None,
            for_arrival_or_departure: None,
            dsf_product_name: None,
            service_request_details: None,
            vendor_name: None,
            on_arrival: false,
            on_departure: false,
            phone_number: None,
            email_address: None,
            quoted_price: Decimal::ZERO,
            special_instruction_value: None,
            vendor_rep: None,
            crew_meal_count: None,
            pax_meal_count: None,
            crew_or_passenger: None,
        }
    }
}

/// Stored service line as returned to clients.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLineRow {
    pub id: Uuid,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub product_status: Option<String>,
    pub quantity: i32,
    pub service_date: Option<DateTime<Utc>>,
    pub vendor_name: Option<String>,
    pub on_arrival: bool,
    pub on_departure: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub quoted_price: Decimal,
    #[serde(rename = "specialInstruction")]
    pub special_instruction_value: Option<String>,
}
