// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Middleware: CORS, tracing and the body size limit only

pub mod base_mapping;
pub mod consent_pdf;
pub mod consents;
pub mod health;

pub use base_mapping::base_mapping_get;
pub use consent_pdf::consent_pdf_post;
pub use consents::consents_get;
pub use health::health_get;
