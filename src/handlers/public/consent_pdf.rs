// handlers/public/consent_pdf.rs - POST /generate-consent-pdf handler

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::error::ApiError;
use crate::middleware::AppJson;
use crate::services::pdf::{self, ConsentDocument};
use crate::state::AppState;

/**
 * POST /generate-consent-pdf - Render a consent document as PDF
 *
 * Expected Input:
 * ```json
 * {
 *   "reservationId": "R00101", "status": "Confirmed", "tailNumber": "N123AB",
 *   "reservationName": "Acme Air", "customerName": "Jane Doe", "fboName": "LAS",
 *   "aircraftType": "G650", "estimatedArrival": "...", "actualArrival": "...",
 *   "estimatedDeparture": "...", "actualDeparture": "...",
 *   "services": [ { "productName": "Fuel", "quantity": 1, "serviceDate": "...", "quotedPrice": 100.5 } ],
 *   "terms": "...", "termsVersion": "2025-08-27-v1",
 *   "signatureBase64": "<base64 PNG>"   // optional
 * }
 * ```
 *
 * Responds with `application/pdf`, shown inline as consent.pdf.
 */
pub async fn consent_pdf_post(
    State(state): State<AppState>,
    AppJson(document): AppJson<ConsentDocument>,
) -> Result<Response, ApiError> {
    let html = pdf::render_html(&document, Utc::now().date_naive());
    let bytes = state.renderer.render(html).await?;

    tracing::info!("Generated consent PDF ({} bytes)", bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "inline; filename=consent.pdf"),
        ],
        bytes,
    )
        .into_response())
}
