// services/consent.rs - consent capture: payload normalization and the write transaction

use base64::{
    alphabet,
    engine::{general_purpose::GeneralPurpose, DecodePaddingMode, GeneralPurposeConfig},
    Engine as _,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use thiserror::Error;

use crate::database::consents::{self, ConsentOutcome};
use crate::database::models::{ConsentDraft, ConsentRecord, ReservationRecord, ServiceLine};
use crate::database::{reservations, service_lines, DatabaseError};
use crate::types::{InvalidField, Loose};

/// Exclusive upper bound on the magnitude of a quoted price
const MAX_QUOTED_PRICE: i64 = 10_000_000_000;

/// Largest accepted signature image, after base64 decoding
pub const MAX_SIGNATURE_BYTES: usize = 2 * 1024 * 1024;

// Clients are inconsistent about padding and trailing bits.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Error)]
pub enum ConsentError {
    #[error("{0}")]
    Validation(String),

    #[error("signature is {size} bytes after decoding")]
    PayloadTooLarge { size: usize },

    #[error("consent already exists for this reservation")]
    Conflict,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for ConsentError {
    fn from(err: sqlx::Error) -> Self {
        ConsentError::Database(err.into())
    }
}

impl From<InvalidField> for ConsentError {
    fn from(err: InvalidField) -> Self {
        ConsentError::Validation(err.to_string())
    }
}

/// Body of `POST /consents` exactly as clients send it.
///
/// Several field names changed over the life of the mobile app; both
/// spellings are accepted here and resolved by `ConsentSubmission::from_payload`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsentPayload {
    pub reservation: Option<ReservationPayload>,
    pub reservation_id: Loose,
    pub reservationid: Loose,
    pub products: Option<Vec<ProductPayload>>,
    pub full_name: Loose,
    pub terms_text: Loose,
    pub terms: Loose,
    pub terms_version: Loose,
    pub signature_base64: Loose,
    pub signature: Loose,
    pub geo_location: Loose,
    pub overwrite: Loose,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReservationPayload {
    pub reservation_id: Loose,
    pub reservationid: Loose,
    pub base_id: Loose,
    pub baseid: Loose,
    pub company_name: Loose,
    pub reservation_name: Loose,
    pub customer_account_number: Loose,
    pub tail_number: Loose,
    pub status: Loose,
    pub reservation_status: Loose,
    pub reservation_type: Loose,
    pub fbo_name: Loose,
    pub created_date: Loose,
    pub flight_name: Loose,
    pub flight_model: Loose,
    pub flight_type: Loose,
    pub arrival_details: Option<ArrivalDetails>,
    pub departure_details: Option<DepartureDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArrivalDetails {
    #[serde(rename = "estimatedArrivalTimeUTC")]
    pub estimated: Loose,
    #[serde(rename = "actualArrivalTimeUTC")]
    pub actual: Loose,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DepartureDetails {
    #[serde(rename = "estimatedDepartureTimeUTC")]
    pub estimated: Loose,
    #[serde(rename = "actualDepartureTimeUTC")]
    pub actual: Loose,
}

/// One product line as the reservation feed names it
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPayload {
    #[serde(rename = "productID", alias = "productId")]
    pub product_id: Loose,
    pub product_name: Loose,
    pub product_status: Loose,
    pub quantity: Loose,
    #[serde(rename = "serviceDateUTC")]
    pub service_date: Loose,
    pub subcase_id: Loose,
    #[serde(rename = "forArrivalorDeparture")]
    pub for_arrival_or_departure: Loose,
    pub dsf_product_name: Loose,
    pub service_request_details: Loose,
    pub vendor_name: Loose,
    pub on_arrival: Loose,
    pub on_departure: Loose,
    pub phone_number: Loose,
    pub email_address: Loose,
    pub quoted_price: Loose,
    pub special_instruction_value: Loose,
    pub vendor_rep: Loose,
    pub crew_meal_count: Loose,
    pub pax_meal_count: Loose,
    #[serde(rename = "crewOrPassanger", alias = "crewOrPassenger")]
    pub crew_or_passenger: Loose,
}

/// First non-blank value among legacy spellings of the same field
fn first_text(candidates: &[&Loose]) -> Option<String> {
    candidates.iter().find_map(|value| value.text())
}

/// A validated consent submission. Building one performs every check that
/// does not need the database, so a submission that exists is writable.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsentSubmission {
    pub reservation: ReservationRecord,
    pub services: Vec<ServiceLine>,
    pub consent: ConsentDraft,
    pub overwrite: bool,
}

impl ConsentSubmission {
    pub fn from_payload(payload: ConsentPayload) -> Result<Self, ConsentError> {
        let empty = ReservationPayload::default();
        let reservation = payload.reservation.as_ref().unwrap_or(&empty);

        let reservation_no = first_text(&[
            &reservation.reservation_id,
            &reservation.reservationid,
            &payload.reservation_id,
            &payload.reservationid,
        ])
        .ok_or_else(|| ConsentError::Validation("reservation.reservationId is required".to_string()))?;

        let full_name = payload.full_name.text();
        let terms_text = first_text(&[&payload.terms_text, &payload.terms]);
        let terms_version = payload.terms_version.text();
        let signature = first_text(&[&payload.signature_base64, &payload.signature]);

        let (Some(full_name), Some(terms_text), Some(terms_version), Some(signature)) =
            (full_name, terms_text, terms_version, signature)
        else {
            return Err(ConsentError::Validation(
                "fullName, termsText, termsVersion, signatureBase64 are required".to_string(),
            ));
        };

        let signature = decode_signature(&signature)?;
        let record = normalize_reservation(reservation_no, reservation)?;
        let services = payload
            .products
            .unwrap_or_default()
            .iter()
            .map(normalize_product)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            reservation: record,
            services,
            consent: ConsentDraft {
                full_name,
                terms_text,
                terms_version,
                geo_location: payload.geo_location.text(),
                signature,
            },
            overwrite: payload.overwrite.flag(),
        })
    }
}

fn normalize_reservation(reservation_no: String, raw: &ReservationPayload) -> Result<ReservationRecord, ConsentError> {
    let arrival = raw.arrival_details.as_ref();
    let departure = raw.departure_details.as_ref();

    Ok(ReservationRecord {
        reservation_no,
        base_id: first_text(&[&raw.base_id, &raw.baseid]),
        reservation_name: first_text(&[&raw.company_name, &raw.reservation_name]),
        customer_account_number: raw.customer_account_number.text(),
        tail_number: raw.tail_number.text(),
        status: first_text(&[&raw.status, &raw.reservation_status]),
        reservation_type: raw.reservation_type.text(),
        est_arrival_at: match arrival {
            Some(a) => a.estimated.timestamp("estimatedArrivalTimeUTC")?,
            None => None,
        },
        act_arrival_at: match arrival {
            Some(a) => a.actual.timestamp("actualArrivalTimeUTC")?,
            None => None,
        },
        est_departure_at: match departure {
            Some(d) => d.estimated.timestamp("estimatedDepartureTimeUTC")?,
            None => None,
        },
        act_departure_at: match departure {
            Some(d) => d.actual.timestamp("actualDepartureTimeUTC")?,
            None => None,
        },
        fbo_name: raw.fbo_name.text(),
        res_created_date: raw.created_date.timestamp("createdDate")?,
        flight_name: raw.flight_name.text(),
        flight_model: raw.flight_model.text(),
        flight_type: raw.flight_type.text(),
    })
}

fn normalize_product(raw: &ProductPayload) -> Result<ServiceLine, ConsentError> {
    let defaults = ServiceLine::default();

    Ok(ServiceLine {
        product_id: raw.product_id.text(),
        product_name: raw.product_name.text(),
        product_status: raw.product_status.text(),
        quantity: raw.quantity.int("quantity")?.unwrap_or(defaults.quantity),
        service_date: raw.service_date.timestamp("serviceDateUTC")?,
        subcase_id: raw.subcase_id.text(),
        for_arrival_or_departure: raw.for_arrival_or_departure.text(),
        dsf_product_name: raw.dsf_product_name.text(),
        service_request_details: raw.service_request_details.text(),
        vendor_name: raw.vendor_name.text(),
        on_arrival: raw.on_arrival.flag(),
        on_departure: raw.on_departure.flag(),
        phone_number: raw.phone_number.text(),
        email_address: raw.email_address.text(),
        quoted_price: quoted_price(&raw.quoted_price)?.unwrap_or(defaults.quoted_price),
        special_instruction_value: raw.special_instruction_value.text(),
        vendor_rep: raw.vendor_rep.text(),
        crew_meal_count: raw.crew_meal_count.int("crewMealCount")?,
        pax_meal_count: raw.pax_meal_count.int("paxMealCount")?,
        crew_or_passenger: raw.crew_or_passenger.text(),
    })
}

/// Prices land in a NUMERIC(12, 2) column; anything that would overflow it
/// or be rounded by it is rejected here instead.
fn quoted_price(raw: &Loose) -> Result<Option<Decimal>, InvalidField> {
    let invalid = InvalidField {
        field: "quotedPrice",
        expected: "a price below 10000000000 with at most 2 decimal places",
    };
    match raw.decimal("quotedPrice")? {
        Some(price) if price.normalize().scale() > 2 || price.abs() >= Decimal::from(MAX_QUOTED_PRICE) => {
            Err(invalid)
        }
        price => Ok(price),
    }
}

/// Drop a `data:<mime>;base64,` prefix if present
pub fn strip_data_uri(encoded: &str) -> &str {
    match encoded.split_once(',') {
        Some((_, data)) => data,
        None => encoded,
    }
}

/// Decode a base64 signature image, rejecting anything over
/// `MAX_SIGNATURE_BYTES`.
pub fn decode_signature(encoded: &str) -> Result<Vec<u8>, ConsentError> {
    let data: String = strip_data_uri(encoded)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = LENIENT_BASE64
        .decode(data.as_bytes())
        .map_err(|_| ConsentError::Validation("signatureBase64 must be valid base64".to_string()))?;

    if bytes.is_empty() {
        return Err(ConsentError::Validation("signatureBase64 must not be empty".to_string()));
    }
    if bytes.len() > MAX_SIGNATURE_BYTES {
        return Err(ConsentError::PayloadTooLarge { size: bytes.len() });
    }
    Ok(bytes)
}

/// What a successful consent write reports back
#[derive(Debug, Clone, PartialEq)]
pub struct ConsentReceipt {
    pub reservation_no: String,
    pub consent: ConsentRecord,
    /// An existing consent was replaced rather than a new one inserted
    pub overwritten: bool,
}

/// Upsert the reservation, replace its service lines and write the consent,
/// all in one transaction.
///
/// Nothing is kept unless every step succeeds. A duplicate consent without
/// `overwrite` rolls back the reservation and service changes too.
pub async fn record(pool: &PgPool, submission: &ConsentSubmission) -> Result<ConsentReceipt, ConsentError> {
    let mut tx = pool.begin().await?;

    match write_submission(&mut *tx, submission).await {
        Ok(receipt) => {
            tx.commit().await?;
            tracing::info!(
                "Recorded consent {} for reservation {} ({}, {} service lines)",
                receipt.consent.id,
                receipt.reservation_no,
                if receipt.overwritten { "replaced" } else { "inserted" },
                submission.services.len()
            );
            Ok(receipt)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(
                    "Rollback failed for reservation {}: {}",
                    submission.reservation.reservation_no,
                    rollback_err
                );
            }
            match &err {
                ConsentError::Conflict => tracing::info!(
                    "Consent for reservation {} already exists, nothing written",
                    submission.reservation.reservation_no
                ),
                other => tracing::warn!(
                    "Consent transaction for reservation {} rolled back: {}",
                    submission.reservation.reservation_no,
                    other
                ),
            }
            Err(err)
        }
    }
}

async fn write_submission(conn: &mut PgConnection, submission: &ConsentSubmission) -> Result<ConsentReceipt, ConsentError> {
    let reservation_id = reservations::upsert(conn, &submission.reservation).await?;
    service_lines::replace(conn, reservation_id, &submission.services).await?;

    let (consent, overwritten) =
        match consents::write(conn, reservation_id, &submission.consent, submission.overwrite).await? {
            ConsentOutcome::Inserted(record) => (record, false),
            ConsentOutcome::Replaced(record) => (record, true),
            ConsentOutcome::Conflict => return Err(ConsentError::Conflict),
        };

    Ok(ConsentReceipt {
        reservation_no: submission.reservation.reservation_no.clone(),
        consent,
        overwritten,
    })
}
