// handlers/protected/consents.rs - POST /consents handler

use axum::{extract::State, http::StatusCode};
use serde::Serialize;

use crate::auth::Claims;
use crate::database::models::ConsentRecord;
use crate::middleware::{ApiResponse, ApiResult, AppJson, AuthUser};
use crate::services::consent::{self, ConsentPayload, ConsentSubmission};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentCreated {
    pub ok: bool,
    pub reservation_id: String,
    pub consent: ConsentRecord,
    pub overwritten: bool,
    pub user: Claims,
}

/**
 * POST /consents - Record a reservation, its services and the signed consent
 *
 * Expected Input:
 * ```json
 * {
 *   "reservation": {
 *     "reservationId": "R00101", "baseId": "LAS", "companyName": "Acme Air",
 *     "customerAccountNumber": "C-1", "tailNumber": "N123AB", "status": "Confirmed",
 *     "arrivalDetails": { "estimatedArrivalTimeUTC": "...", "actualArrivalTimeUTC": "..." },
 *     "departureDetails": { "estimatedDepartureTimeUTC": "...", "actualDepartureTimeUTC": "..." }
 *   },
 *   "products": [ { "productID": "P1", "productName": "Fuel", "quantity": 1, "quotedPrice": 0 } ],
 *   "fullName": "Jane Doe",
 *   "termsText": "...",
 *   "termsVersion": "2025-08-27-v1",
 *   "signatureBase64": "data:image/png;base64,...",
 *   "geoLocation": "36.08,-115.15",
 *   "overwrite": false
 * }
 * ```
 *
 * Expected Output: 201 for a new consent, 200 when overwrite replaced one.
 * ```json
 * {
 *   "ok": true,
 *   "reservationId": "R00101",
 *   "consent": { "id": "...", "termsVersion": "...", "geoLocation": "...", "channel": "Mobile App",
 *                "createdAt": "...", "updatedAt": "..." },
 *   "overwritten": false,
 *   "user": { ...token claims }
 * }
 * ```
 *
 * A second consent without overwrite is a 409 and leaves nothing changed.
 */
pub async fn consents_post(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AppJson(payload): AppJson<ConsentPayload>,
) -> ApiResult<ConsentCreated> {
    let submission = ConsentSubmission::from_payload(payload)?;
    let receipt = consent::record(&state.pool, &submission).await?;

    let status = if receipt.overwritten { StatusCode::OK } else { StatusCode::CREATED };

    Ok(ApiResponse::with_status(
        ConsentCreated {
            ok: true,
            reservation_id: receipt.reservation_no,
            consent: receipt.consent,
            overwritten: receipt.overwritten,
            user: claims,
        },
        status,
    ))
}
