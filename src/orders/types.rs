use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::orders::status::OrderStatus;

/// One inbound provider callback, parsed from query parameters. Ephemeral:
/// it lives for the duration of a single request and is only persisted
/// through the audit trail.
#[derive(Debug, Clone)]
pub struct PaymentRedirectEvent {
    pub order_id: String,
    pub provider_status: Option<String>,
    pub transaction_id: Option<String>,
    pub amount: Option<BigDecimal>,
    pub currency: String,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// Append-only audit row, one per inbound callback (not per order).
/// Duplicate provider deliveries each get their own row; idempotency of the
/// order transition itself is the settlement backend's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookLogEntry {
    pub order_id: String,
    pub webhook_type: String,
    pub status: OrderStatus,
    pub transaction_id: Option<String>,
    pub amount: Option<BigDecimal>,
    pub currency: String,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub processed_at: DateTime<Utc>,
}

/// Order snapshot as read from the order store. This service never mutates
/// orders; settlement owns the writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    pub amount: Option<BigDecimal>,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentRedirectEvent {
    /// Audit row for this event under the given canonical status.
    pub fn to_log_entry(&self, status: OrderStatus, webhook_type: &str) -> WebhookLogEntry {
        WebhookLogEntry {
            order_id: self.order_id.clone(),
            webhook_type: webhook_type.to_string(),
            status,
            transaction_id: self.transaction_id.clone(),
            amount: self.amount.clone(),
            currency: self.currency.clone(),
            error_code: self.error_code.clone(),
            error_message: self.error_message.clone(),
            processed_at: self.received_at,
        }
    }
}
