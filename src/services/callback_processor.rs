//! Staged processing of a provider payment callback.
//!
//! Each stage returns a `Result` with a tagged error kind and the
//! orchestrator decides per kind whether to keep going: audit failures never
//! stop the pipeline, validation and processing failures short-circuit to a
//! designated error redirect. Whatever happens, the caller always gets a
//! result-page URL back.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::Utc;
use thiserror::Error;
use tracing::error;

use crate::orders::status::OrderStatus;
use crate::orders::types::PaymentRedirectEvent;
use crate::services::audit::{AuditLogger, AuditStore, RequestMeta};
use crate::services::redirect::{RedirectComposer, RedirectErrorKind, RedirectFields};

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("missing required parameter orderId")]
    MissingOrderId,
    #[error("malformed amount {amount:?} for order {order_id}")]
    MalformedAmount { order_id: String, amount: String },
}

pub struct CallbackProcessor {
    audit: AuditLogger,
    composer: RedirectComposer,
    default_currency: String,
}

impl CallbackProcessor {
    pub fn new(
        store: Arc<dyn AuditStore>,
        composer: RedirectComposer,
        default_currency: impl Into<String>,
    ) -> Self {
        Self {
            audit: AuditLogger::new(store),
            composer,
            default_currency: default_currency.into(),
        }
    }

    /// Run the full validate → map → audit → compose pipeline. Infallible
    /// by contract: every branch, including the error ones, ends in a
    /// navigable result-page URL.
    pub async fn process(&self, params: &HashMap<String, String>, meta: &RequestMeta) -> String {
        match self.parse_event(params) {
            Ok(event) => {
                let status = OrderStatus::from_provider(event.provider_status.as_deref());
                self.audit.record(&event, status, meta).await;
                self.composer.compose(
                    &event.order_id,
                    status,
                    &RedirectFields {
                        transaction_id: event.transaction_id.clone(),
                        amount: event.amount.clone(),
                        currency: Some(event.currency.clone()),
                        error_code: event.error_code.clone(),
                        error_message: event.error_message.clone(),
                    },
                )
            }
            Err(CallbackError::MissingOrderId) => {
                let raw_query = serde_urlencoded::to_string(params).unwrap_or_default();
                self.audit
                    .record_validation_failure(&raw_query, meta)
                    .await;
                self.composer
                    .compose_error(RedirectErrorKind::MissingOrderId, None)
            }
            Err(CallbackError::MalformedAmount { order_id, amount }) => {
                error!(
                    order_id = %order_id,
                    amount = %amount,
                    "callback processing failed: malformed amount"
                );
                self.composer
                    .compose_error(RedirectErrorKind::ProcessingFailed, Some(&order_id))
            }
        }
    }

    /// Safety-net redirect used by the HTTP layer when processing blows up
    /// in a way no stage anticipated.
    pub fn unexpected_error_redirect(&self, order_id: Option<&str>) -> String {
        self.composer
            .compose_error(RedirectErrorKind::UnexpectedError, order_id)
    }

    /// Parse stage: resolve parameter aliases and build the event. The
    /// order id gate runs before anything else touches the event.
    fn parse_event(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<PaymentRedirectEvent, CallbackError> {
        let order_id = param(params, &["orderId", "order_id"])
            .filter(|v| !v.trim().is_empty())
            .ok_or(CallbackError::MissingOrderId)?;

        let amount = match param(params, &["amount"]) {
            Some(raw) => Some(BigDecimal::from_str(&raw).map_err(|_| {
                CallbackError::MalformedAmount {
                    order_id: order_id.clone(),
                    amount: raw,
                }
            })?),
            None => None,
        };

        Ok(PaymentRedirectEvent {
            order_id,
            provider_status: param(params, &["status", "payment_status"]),
            transaction_id: param(params, &["transactionId", "transaction_id"]),
            amount,
            currency: param(params, &["currency"])
                .unwrap_or_else(|| self.default_currency.clone()),
            error_code: param(params, &["errorCode", "error_code"]),
            error_message: param(params, &["errorMessage", "error_message"]),
            received_at: Utc::now(),
        })
    }
}

fn param(params: &HashMap<String, String>, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .find_map(|key| params.get(*key))
        .filter(|v| !v.is_empty())
        .cloned()
}
