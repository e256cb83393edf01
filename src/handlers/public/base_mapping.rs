// handlers/public/base_mapping.rs - GET /base-mapping handler

use axum::extract::State;
use serde::Serialize;

use crate::database::bases;
use crate::database::models::BaseMapping;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BaseListing {
    pub count: usize,
    pub bases: Vec<BaseMapping>,
}

/**
 * GET /base-mapping - List every base in the reference table
 *
 * Expected Output:
 * ```json
 * {
 *   "count": 2,
 *   "bases": [
 *     { "base_id": "LAS", "iata": "LAS", "icao": "KLAS", "fbo_name": "...", "active": true, ... }
 *   ]
 * }
 * ```
 *
 * Rows keep their column names and are ordered by base_id.
 */
pub async fn base_mapping_get(State(state): State<AppState>) -> ApiResult<BaseListing> {
    let bases = bases::list(&state.pool).await?;
    Ok(ApiResponse::success(BaseListing {
        count: bases.len(),
        bases,
    }))
}
