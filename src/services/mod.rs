pub mod consent;
pub mod pdf;
pub mod reservation_feed;

pub use consent::{ConsentError, ConsentReceipt, ConsentSubmission};
pub use pdf::{HttpPdfRenderer, PdfRenderer, RenderError};
pub use reservation_feed::{FeedError, ReservationFeed, SignetFeed};
