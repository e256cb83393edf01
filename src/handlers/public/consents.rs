// handlers/public/consents.rs - GET /consents handler

use axum::extract::State;
use serde::Deserialize;

use crate::database::views::{self, ReservationView};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AppQuery};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentQuery {
    pub reservation_id: Option<String>,
    pub include_signature: Option<String>,
}

/// Only `true` (any case) and `1` opt in
fn is_truthy(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        Some(v) => v == "1" || v.eq_ignore_ascii_case("true"),
        None => false,
    }
}

/**
 * GET /consents?reservationId=R00101&includeSignature=true
 *
 * Returns the stored reservation with its base details, service lines and
 * consent:
 * ```json
 * {
 *   "reservation": { "reservationId": "R00101", "tailNumber": "N123AB", ... },
 *   "baseDetails": { "companyCode": "...", "iata": "LAS", ... } | null,
 *   "services": [ { "id": "...", "productName": "Fuel", "quantity": 1, "quotedPrice": 0.0, ... } ],
 *   "consent": { "id": "...", "fullName": "Jane Doe", "termsVersion": "...", "signature": "<base64>" } | null
 * }
 * ```
 *
 * The signature is only present when includeSignature is requested.
 */
pub async fn consents_get(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ConsentQuery>,
) -> ApiResult<ReservationView> {
    let reservation_id = query
        .reservation_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::validation_error("reservationId query param is required"))?;

    let include_signature = is_truthy(query.include_signature.as_deref());
    let view = views::reservation_view(&state.pool, reservation_id, include_signature).await?;

    Ok(ApiResponse::success(view))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_signature_accepts_true_and_one() {
        assert!(is_truthy(Some("true")));
        assert!(is_truthy(Some("TRUE")));
        assert!(is_truthy(Some("1")));
        assert!(!is_truthy(Some("yes")));
        assert!(!is_truthy(Some("0")));
        assert!(!is_truthy(Some("")));
        assert!(!is_truthy(None));
    }
}
