use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{BaseMapping, ConsentRow, ReservationRow, ServiceLineRow};
use crate::database::{bases, consents, reservations, service_lines};

/// Most rows the search listing returns
pub const SEARCH_LIMIT: i64 = 100;

/// Reservation joined with its consent, services and base reference data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationView {
    pub reservation: ReservationRow,
    pub base_details: Option<BaseDetails>,
    pub services: Vec<ServiceLineRow>,
    pub consent: Option<ConsentView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseDetails {
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

impl From<BaseMapping> for BaseDetails {
    fn from(base: BaseMapping) -> Self {
        Self {
            company_code: base.company_code,
            base_number: base.base_number,
            iata: base.iata,
            icao: base.icao,
            region: base.region,
            business_division: base.business_division,
            base_description: base.base_description,
            fbo_name: base.fbo_name,
            city: base.city,
            state: base.state,
            active: base.active,
            currency_code: base.currency_code,
            default_units: base.default_units,
            base_country: base.base_country,
            base_time_zone: base.base_time_zone,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentView {
    pub id: Uuid,
    pub full_name: String,
    pub terms_version: String,
    pub terms_and_conditions: String,
    pub geo_location: Option<String>,
    pub channel: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Base64 of the stored image; absent unless explicitly requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl From<ConsentRow> for ConsentView {
    fn from(row: ConsentRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            terms_version: row.terms_version,
            terms_and_conditions: row.terms_and_conditions,
            geo_location: row.geo_location,
            channel: row.channel,
            created_at: row.created_at,
            updated_at: row.updated_at,
            signature: row.signature_image.map(|bytes| STANDARD.encode(bytes)),
        }
    }
}

/// Load the joined view of one reservation, `NotFound` when it doesn't exist.
pub async fn reservation_view(
    pool: &PgPool,
    reservation_no: &str,
    include_signature: bool,
) -> Result<ReservationView, DatabaseError> {
    let mut conn = pool.acquire().await?;

    let reservation = reservations::find_by_number(&mut conn, reservation_no)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Reservation or consent not found".to_string()))?;

    let consent = consents::find_for_reservation(&mut conn, reservation.id, include_signature).await?;
    let services = service_lines::list(&mut conn, reservation.id).await?;
    let base = match reservation.base_id.as_deref() {
        Some(base_id) => bases::find(&mut conn, base_id).await?,
        None => None,
    };

    Ok(ReservationView {
        reservation,
        base_details: base.map(BaseDetails::from),
        services,
        consent: consent.map(ConsentView::from),
    })
}

#[derive(Debug, Clone, FromRow)]
struct SearchRow {
    reservation_no: String,
    base_id: Option<String>,
    reservation_name: Option<String>,
    customer_account_number: Option<String>,
    tail_number: Option<String>,
    status: Option<String>,
    created_at: DateTime<Utc>,
    est_arrival_at: Option<DateTime<Utc>>,
    act_arrival_at: Option<DateTime<Utc>>,
    est_departure_at: Option<DateTime<Utc>>,
    act_departure_at: Option<DateTime<Utc>>,
    consent_id: Option<Uuid>,
    consent_name: Option<String>,
    terms_version: Option<String>,
    geo_location: Option<String>,
    consent_created_at: Option<DateTime<Utc>>,
}

/// One row of the reservation search listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSummary {
    pub reservation_id: String,
    pub base_id: Option<String>,
    pub reservation_name: Option<String>,
    pub customer_account_number: Option<String>,
    pub tail_number: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub estimated_arrival: Option<DateTime<Utc>>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub estimated_departure: Option<DateTime<Utc>>,
    pub actual_departure: Option<DateTime<Utc>>,
    pub consent: Option<ConsentSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub terms_version: Option<String>,
    pub geo_location: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<SearchRow> for ReservationSummary {
    fn from(row: SearchRow) -> Self {
        let consent = row.consent_id.map(|id| ConsentSummary {
            id,
            name: row.consent_name,
            terms_version: row.terms_version,
            geo_location: row.geo_location,
            created_at: row.consent_created_at,
        });

        Self {
            reservation_id: row.reservation_no,
            base_id: row.base_id,
            reservation_name: row.reservation_name,
            customer_account_number: row.customer_account_number,
            tail_number: row.tail_number,
            status: row.status,
            created_at: row.created_at,
            estimated_arrival: row.est_arrival_at,
            actual_arrival: row.act_arrival_at,
            estimated_departure: row.est_departure_at,
            actual_departure: row.act_departure_at,
            consent,
        }
    }
}

/// Newest reservations first, optionally narrowed by a case-insensitive
/// substring over reservation number, tail number, reservation name and
/// signer name.
pub async fn search(pool: &PgPool, search_text: Option<&str>) -> Result<Vec<ReservationSummary>, DatabaseError> {
    let pattern = search_text
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| format!("%{}%", escape_like(text)));

    let rows = sqlx::query_as::<_, SearchRow>(
        r#"
        SELECT r.reservation_no, r.base_id, r.reservation_name, r.customer_account_number,
               r.tail_number, r.status, r.created_at, r.est_arrival_at, r.act_arrival_at,
               r.est_departure_at, r.act_departure_at,
               c.id AS consent_id, c.full_name AS consent_name, c.terms_version,
               c.geo_location, c.created_at AS consent_created_at
        FROM reservations r
        LEFT JOIN consents c ON c.reservation_id = r.id
        WHERE $1::text IS NULL
           OR r.reservation_no ILIKE $1
           OR r.tail_number ILIKE $1
           OR r.reservation_name ILIKE $1
           OR c.full_name ILIKE $1
        ORDER BY r.created_at DESC
        LIMIT $2
        "#,
    )
    .bind(pattern)
    .bind(SEARCH_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ReservationSummary::from).collect())
}

/// Treat `%`, `_` and `\` in user input as literals
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
