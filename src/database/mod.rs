pub mod bases;
pub mod consents;
pub mod manager;
pub mod models;
pub mod preferences;
pub mod reservations;
pub mod service_lines;
pub mod views;

pub use manager::{DatabaseError, DatabaseManager};
