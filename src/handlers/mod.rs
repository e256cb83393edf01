// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Protected (bearer JWT) → Elevated (admin client credentials)
//
// Authentication is attached per method in routes.rs, so one path can mix
// tiers: GET /consents is public while POST /consents is protected.

use axum::http::StatusCode;

pub mod elevated;  // Admin client credentials required
pub mod protected; // Bearer JWT required
pub mod public;    // No authentication

/// OPTIONS on any route: 200 with an empty body
pub async fn options_ok() -> StatusCode {
    StatusCode::OK
}
