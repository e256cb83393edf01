// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: RS256 bearer token, verified against the issuer's JWKS
// Middleware: jwt_auth_middleware, which inserts AuthUser for the handler
//
// Every response from this tier echoes the caller's claims as `user`.

pub mod base_preferences;
pub mod consent_reservations;
pub mod consents;
pub mod fetch_reservations;

pub use base_preferences::{base_preferences_get, base_preferences_post};
pub use consent_reservations::consent_reservations_get;
pub use consents::consents_post;
pub use fetch_reservations::fetch_reservations_get;
