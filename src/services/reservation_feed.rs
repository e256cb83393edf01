// services/reservation_feed.rs - upstream reservation feed client and consent merge

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::FeedConfig;
use crate::database::models::StoredConsent;
use crate::types::Loose;

const FBO_OPERATIONS_PATH: &str = "/ops/v1/dashboard/fbo-operations";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("reservation feed URL is not configured")]
    NotConfigured,

    #[error("invalid reservation feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("reservation feed request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("reservation feed returned {status}")]
    Status { status: u16 },

    #[error("reservation feed returned an unreadable body: {0}")]
    Decode(String),
}

/// Window of FBO operations to pull for one customer account
#[derive(Debug, Clone, PartialEq)]
pub struct FeedQuery {
    pub requestor_id: String,
    pub company_account_number: String,
    pub start_date: String,
    pub end_date: String,
}

/// Reservation as the upstream dashboard returns it. Nested detail objects
/// and product lines are passed through untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedReservation {
    pub baseid: Loose,
    pub reservationid: Loose,
    pub company_name: Option<String>,
    pub customer_account_number: Option<String>,
    pub tail_number: Option<String>,
    pub reservation_status: Option<String>,
    pub arrival_details: Option<Value>,
    pub departure_details: Option<Value>,
    pub products: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    #[serde(default)]
    data: Option<Vec<FeedReservation>>,
}

#[async_trait]
pub trait ReservationFeed: Send + Sync {
    async fn fetch(&self, query: &FeedQuery) -> Result<Vec<FeedReservation>, FeedError>;
}

/// HTTP client for the Signet FBO operations dashboard
pub struct SignetFeed {
    client: reqwest::Client,
    base_url: Option<String>,
    api_key: String,
    timeout: Duration,
}

impl SignetFeed {
    pub fn new(client: reqwest::Client, config: &FeedConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn operations_url(&self, query: &FeedQuery) -> Result<Url, FeedError> {
        let base = self.base_url.as_deref().ok_or(FeedError::NotConfigured)?;
        let mut url = Url::parse(&format!("{}{}", base.trim_end_matches('/'), FBO_OPERATIONS_PATH))?;
        url.query_pairs_mut()
            .append_pair("requestor-id", &query.requestor_id)
            .append_pair("company-account-number", &query.company_account_number)
            .append_pair("startDate", &query.start_date)
            .append_pair("endDate", &query.end_date);
        Ok(url)
    }
}

#[async_trait]
impl ReservationFeed for SignetFeed {
    async fn fetch(&self, query: &FeedQuery) -> Result<Vec<FeedReservation>, FeedError> {
        let url = self.operations_url(query)?;
        tracing::debug!("Fetching reservations from {}", url.path());

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status { status: status.as_u16() });
        }

        let envelope: FeedEnvelope = response
            .json()
            .await
            .map_err(|e| FeedError::Decode(e.to_string()))?;

        Ok(envelope.data.unwrap_or_default())
    }
}

/// Feed reservation with any consent captured for it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedReservation {
    pub base_id: Option<String>,
    pub reservation_id: Option<String>,
    pub reservation_name: Option<String>,
    pub customer_account_number: Option<String>,
    pub tail_number: Option<String>,
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_details: Option<Value>,
    pub products: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent: Option<FeedConsent>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedConsent {
    pub name: String,
    pub terms_version: String,
    pub geo_location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub signature: String,
}

impl From<StoredConsent> for FeedConsent {
    fn from(stored: StoredConsent) -> Self {
        Self {
            name: stored.full_name,
            terms_version: stored.terms_version,
            geo_location: stored.geo_location,
            created_at: stored.created_at,
            signature: STANDARD.encode(&stored.signature_image),
        }
    }
}

/// Reservation numbers worth looking up consents for
pub fn reservation_numbers(reservations: &[FeedReservation]) -> Vec<String> {
    reservations.iter().filter_map(|r| r.reservationid.text()).collect()
}

/// Attach stored consents to feed reservations by reservation number,
/// keeping feed order.
pub fn merge_consents(reservations: Vec<FeedReservation>, consents: Vec<StoredConsent>) -> Vec<MergedReservation> {
    let by_number: HashMap<String, FeedConsent> = consents
        .into_iter()
        .map(|c| (c.reservation_no.clone(), FeedConsent::from(c)))
        .collect();

    reservations
        .into_iter()
        .map(|r| {
            let reservation_id = r.reservationid.text();
            let consent = reservation_id.as_ref().and_then(|no| by_number.get(no).cloned());
            MergedReservation {
                base_id: r.baseid.text(),
                reservation_id,
                reservation_name: r.company_name,
                customer_account_number: r.customer_account_number,
                tail_number: r.tail_number,
                status: r.reservation_status,
                arrival_details: r.arrival_details,
                departure_details: r.departure_details,
                products: r.products.unwrap_or_default(),
                consent,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored(no: &str) -> StoredConsent {
        StoredConsent {
            reservation_no: no.to_string(),
            full_name: "Jane Doe".to_string(),
            terms_version: "v1".to_string(),
            geo_location: Some("36.08,-115.15".to_string()),
            created_at: Utc::now(),
            signature_image: vec![1, 2, 3],
        }
    }

    fn feed(value: Value) -> Vec<FeedReservation> {
        serde_json::from_value::<FeedEnvelope>(value).unwrap().data.unwrap_or_default()
    }

    #[test]
    fn merge_attaches_consent_by_reservation_number() {
        let reservations = feed(json!({ "data": [
            { "reservationid": "R1", "baseid": "LAS", "companyName": "Acme", "reservationStatus": "Confirmed",
              "arrivalDetails": { "estimatedArrivalTimeUTC": "2025-08-27T14:00:00Z" },
              "products": [{ "productName": "Fuel" }] },
            { "reservationid": 2, "companyName": "Numeric Id Co" }
        ]}));
        assert_eq!(reservation_numbers(&reservations), vec!["R1", "2"]);

        let merged = merge_consents(reservations, vec![stored("R1")]);
        assert_eq!(merged.len(), 2);

        let first = serde_json::to_value(&merged[0]).unwrap();
        assert_eq!(first["reservationId"], "R1");
        assert_eq!(first["baseId"], "LAS");
        assert_eq!(first["reservationName"], "Acme");
        assert_eq!(first["status"], "Confirmed");
        assert_eq!(first["products"][0]["productName"], "Fuel");
        assert_eq!(first["consent"]["name"], "Jane Doe");
        assert_eq!(first["consent"]["signature"], "AQID");

        let second = serde_json::to_value(&merged[1]).unwrap();
        assert_eq!(second["reservationId"], "2");
        assert!(second.get("consent").is_none());
        assert_eq!(second["products"], json!([]));
    }

    #[test]
    fn missing_data_means_no_reservations() {
        assert!(feed(json!({})).is_empty());
        assert!(feed(json!({ "data": null })).is_empty());
    }

    #[test]
    fn operations_url_carries_the_window() {
        let feed = SignetFeed::new(
            reqwest::Client::new(),
            &FeedConfig {
                base_url: Some("https://signet.example.com/".to_string()),
                api_key: "key".to_string(),
                timeout_secs: 5,
            },
        );
        let url = feed
            .operations_url(&FeedQuery {
                requestor_id: "ops user".to_string(),
                company_account_number: "C-1".to_string(),
                start_date: "2025-08-01".to_string(),
                end_date: "2025-08-31".to_string(),
            })
            .unwrap();
        assert_eq!(url.path(), "/ops/v1/dashboard/fbo-operations");
        assert_eq!(
            url.query(),
            Some("requestor-id=ops+user&company-account-number=C-1&startDate=2025-08-01&endDate=2025-08-31")
        );
    }

    #[test]
    fn unconfigured_feed_is_an_error() {
        let feed = SignetFeed::new(
            reqwest::Client::new(),
            &FeedConfig { base_url: None, api_key: String::new(), timeout_secs: 5 },
        );
        let query = FeedQuery {
            requestor_id: "a".into(),
            company_account_number: "b".into(),
            start_date: "c".into(),
            end_date: "d".into(),
        };
        assert!(matches!(feed.operations_url(&query), Err(FeedError::NotConfigured)));
    }
}
