// handlers/elevated/mod.rs - Elevated handlers (admin client credentials required)
//
// Security Level: x-client-id / x-client-secret shared secret
// Middleware: admin_credentials_middleware, checked before method dispatch

pub mod base_email;

pub use base_email::base_email_post;
