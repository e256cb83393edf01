// handlers/protected/consent_reservations.rs - GET /consentReservations handler

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth::Claims;
use crate::database::views::{self, ReservationSummary};
use crate::middleware::{ApiResponse, ApiResult, AppQuery, AuthUser};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub search_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub data: Vec<ReservationSummary>,
    pub count: usize,
    pub user: Claims,
}

/// GET /consentReservations?searchText= - newest stored reservations, with
/// consent summaries, optionally filtered.
pub async fn consent_reservations_get(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AppQuery(query): AppQuery<SearchQuery>,
) -> ApiResult<SearchResults> {
    let data = views::search(&state.pool, query.search_text.as_deref()).await?;

    Ok(ApiResponse::success(SearchResults {
        count: data.len(),
        data,
        user: claims,
    }))
}
