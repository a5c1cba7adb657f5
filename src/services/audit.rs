//! Best-effort audit trail for provider callbacks.
//!
//! Every inbound callback gets one append-only log row. The write is never
//! allowed to block or fail the user-facing redirect: store errors are
//! reported through tracing and swallowed.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::orders::status::OrderStatus;
use crate::orders::types::{PaymentRedirectEvent, WebhookLogEntry};

pub const WEBHOOK_TYPE_SUCCESS_REDIRECT: &str = "netopia_success_redirect";

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit store error: {0}")]
    Store(String),
}

/// Forensic metadata accompanying every audit write. Not part of the log
/// entry schema itself.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub request_path: String,
}

/// Append-only sink for callback audit rows. Backed by Postgres in
/// production and by in-memory doubles in tests.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Insert one log row. Pure insert, no read-modify-write.
    async fn insert_log(&self, entry: &WebhookLogEntry, meta: &RequestMeta)
        -> Result<(), AuditError>;

    /// Record a callback that failed validation and therefore has no order
    /// id to attribute. Carries only the raw query and request path.
    async fn insert_validation_failure(
        &self,
        raw_query: &str,
        meta: &RequestMeta,
    ) -> Result<(), AuditError>;
}

pub struct AuditLogger {
    store: Arc<dyn AuditStore>,
}

impl AuditLogger {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Persist one audit row for the event. Infallible by contract: a store
    /// failure is logged and dropped so the redirect proceeds regardless.
    pub async fn record(
        &self,
        event: &PaymentRedirectEvent,
        status: OrderStatus,
        meta: &RequestMeta,
    ) {
        let entry = event.to_log_entry(status, WEBHOOK_TYPE_SUCCESS_REDIRECT);
        match self.store.insert_log(&entry, meta).await {
            Ok(()) => {
                info!(
                    order_id = %entry.order_id,
                    status = %entry.status,
                    client_ip = meta.client_ip.as_deref().unwrap_or("unknown"),
                    user_agent = meta.user_agent.as_deref().unwrap_or("unknown"),
                    "callback audit row written"
                );
            }
            Err(e) => {
                error!(
                    order_id = %entry.order_id,
                    status = %entry.status,
                    error = %e,
                    "failed to write callback audit row, continuing"
                );
            }
        }
    }

    /// Best-effort record of a callback rejected for a missing order id.
    pub async fn record_validation_failure(&self, raw_query: &str, meta: &RequestMeta) {
        error!(
            raw_query = %raw_query,
            request_path = %meta.request_path,
            client_ip = meta.client_ip.as_deref().unwrap_or("unknown"),
            user_agent = meta.user_agent.as_deref().unwrap_or("unknown"),
            "provider callback rejected: missing order id"
        );
        if let Err(e) = self.store.insert_validation_failure(raw_query, meta).await {
            error!(error = %e, "failed to record validation failure, continuing");
        }
    }
}
