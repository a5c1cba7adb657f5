//! Composition of the browser redirect issued after a provider callback.
//!
//! The result page URL is pure data: same inputs produce the same query
//! string except for the cache-busting `timestamp`, which is strictly
//! increasing so no browser or CDN ever serves a stale result page.

use std::sync::atomic::{AtomicI64, Ordering};

use bigdecimal::BigDecimal;
use chrono::Utc;

use crate::orders::status::OrderStatus;

/// Monotonic millisecond source. Returns `max(now_ms, last + 1)` so two
/// compositions in the same millisecond still differ.
#[derive(Debug, Default)]
pub struct CacheBuster {
    last: AtomicI64,
}

impl CacheBuster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        self.last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            // fetch_update only fails when the closure returns None
            .map(|last| now.max(last + 1))
            .unwrap_or(now)
    }
}

/// Optional fields forwarded to the result page when present.
#[derive(Debug, Clone, Default)]
pub struct RedirectFields {
    pub transaction_id: Option<String>,
    pub amount: Option<BigDecimal>,
    pub currency: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

/// Error variants the result page understands. Each still renders a
/// navigable page; there is no dead-end error URL in the payment flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectErrorKind {
    MissingOrderId,
    ProcessingFailed,
    UnexpectedError,
}

impl RedirectErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectErrorKind::MissingOrderId => "missing_order_id",
            RedirectErrorKind::ProcessingFailed => "processing_failed",
            RedirectErrorKind::UnexpectedError => "unexpected_error",
        }
    }
}

/// Builds result-page URLs. Pure construction, no I/O.
#[derive(Debug)]
pub struct RedirectComposer {
    result_page_path: String,
    buster: CacheBuster,
}

impl RedirectComposer {
    pub fn new(result_page_path: impl Into<String>) -> Self {
        Self {
            result_page_path: result_page_path.into(),
            buster: CacheBuster::new(),
        }
    }

    /// Canonical success-path redirect: orderId, lower-case status, any
    /// known optional fields, and the cache buster.
    pub fn compose(
        &self,
        order_id: &str,
        status: OrderStatus,
        fields: &RedirectFields,
    ) -> String {
        let mut pairs: Vec<(&str, String)> = vec![
            ("orderId", order_id.to_string()),
            ("status", status.as_str().to_string()),
        ];
        if let Some(tx) = &fields.transaction_id {
            pairs.push(("transactionId", tx.clone()));
        }
        if let Some(amount) = &fields.amount {
            pairs.push(("amount", amount.to_string()));
        }
        if let Some(currency) = &fields.currency {
            pairs.push(("currency", currency.clone()));
        }
        if let Some(code) = &fields.error_code {
            pairs.push(("errorCode", code.clone()));
        }
        if let Some(message) = &fields.error_message {
            pairs.push(("errorMessage", message.clone()));
        }
        self.finish(pairs)
    }

    /// Error-branch redirect. Carries the order id when it is known so the
    /// result page can still offer a retry.
    pub fn compose_error(&self, kind: RedirectErrorKind, order_id: Option<&str>) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::with_capacity(3);
        if let Some(id) = order_id {
            pairs.push(("orderId", id.to_string()));
        }
        pairs.push(("error", kind.as_str().to_string()));
        self.finish(pairs)
    }

    fn finish(&self, mut pairs: Vec<(&str, String)>) -> String {
        pairs.push(("timestamp", self.buster.next().to_string()));
        let query = serde_urlencoded::to_string(&pairs).unwrap_or_default();
        format!("{}?{}", self.result_page_path, query)
    }
}
