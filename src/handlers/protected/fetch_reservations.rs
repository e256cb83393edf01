// handlers/protected/fetch_reservations.rs - GET /fetchReservations handler

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth::Claims;
use crate::database::consents;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AppQuery, AuthUser};
use crate::services::reservation_feed::{merge_consents, reservation_numbers, FeedQuery, MergedReservation};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchQuery {
    pub requestor_id: Option<String>,
    pub company_account_number: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl FetchQuery {
    fn into_feed_query(self) -> Option<FeedQuery> {
        let present = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Some(FeedQuery {
            requestor_id: present(self.requestor_id)?,
            company_account_number: present(self.company_account_number)?,
            start_date: present(self.start_date)?,
            end_date: present(self.end_date)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct FetchResults {
    pub data: Vec<MergedReservation>,
    pub user: Claims,
}

/**
 * GET /fetchReservations?requestorId=&companyAccountNumber=&startDate=&endDate=
 *
 * Pulls the caller's reservations from the upstream dashboard feed and
 * attaches any consent already captured for each one:
 * ```json
 * {
 *   "data": [
 *     { "reservationId": "R00101", "baseId": "LAS", "reservationName": "Acme Air", "status": "...",
 *       "arrivalDetails": {...}, "departureDetails": {...}, "products": [...],
 *       "consent": { "name": "Jane Doe", "termsVersion": "...", "geoLocation": "...",
 *                    "createdAt": "...", "signature": "<base64>" } }
 *   ],
 *   "user": { ...token claims }
 * }
 * ```
 */
pub async fn fetch_reservations_get(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AppQuery(query): AppQuery<FetchQuery>,
) -> ApiResult<FetchResults> {
    let feed_query = query.into_feed_query().ok_or_else(|| {
        ApiError::validation_error(
            "requestorId, companyAccountNumber, startDate, and endDate are required query params",
        )
    })?;

    let reservations = state.feed.fetch(&feed_query).await?;
    let numbers = reservation_numbers(&reservations);
    let stored = consents::find_by_reservation_numbers(&state.pool, &numbers).await?;

    tracing::debug!(
        "Merged {} stored consents into {} feed reservations",
        stored.len(),
        reservations.len()
    );

    Ok(ApiResponse::success(FetchResults {
        data: merge_consents(reservations, stored),
        user: claims,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_window_parameter_is_required() {
        let full = || FetchQuery {
            requestor_id: Some("ops".into()),
            company_account_number: Some("C-1".into()),
            start_date: Some("2025-08-01".into()),
            end_date: Some("2025-08-31".into()),
        };
        assert!(full().into_feed_query().is_some());
        assert!(FetchQuery { end_date: None, ..full() }.into_feed_query().is_none());
        assert!(FetchQuery { requestor_id: Some("  ".into()), ..full() }.into_feed_query().is_none());
    }
}
