pub mod base;
pub mod consent;
pub mod preference;
pub mod reservation;
pub mod service_line;

pub use base::BaseMapping;
pub use consent::{ConsentDraft, ConsentRecord, ConsentRow, StoredConsent, CONSENT_CHANNEL};
pub use preference::EmailPreference;
pub use reservation::{ReservationRecord, ReservationRow};
pub use service_line::{ServiceLine, ServiceLineRow};
