pub mod status;
pub mod types;

pub use status::OrderStatus;
pub use types::{Order, PaymentRedirectEvent, WebhookLogEntry};
