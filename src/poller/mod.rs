//! Client-side reconciliation of the eventual-consistency gap between the
//! browser redirect and payment settlement.
//!
//! The redirect lands the user on the result page before the backend has
//! necessarily finished settling, so the page polls order status until it
//! reaches a terminal state or a bounded attempt budget runs out. The loop
//! is an owned object with explicit start/stop; no timer outlives it.

pub mod gateway;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::orders::status::OrderStatus;
use crate::orders::types::Order;
use gateway::OrderQueryGateway;

#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay between consecutive order queries.
    pub interval: Duration,
    /// Hard cap on queries per poll run. Reaching it is exhaustion, not an
    /// error: the UI stays in "still processing".
    pub max_attempts: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 30,
        }
    }
}

impl PollerConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.interval = Duration::from_secs(
            std::env::var("ORDER_POLL_INTERVAL_SECONDS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(cfg.interval.as_secs()),
        );
        cfg.max_attempts = std::env::var("ORDER_POLL_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(cfg.max_attempts);
        cfg
    }
}

/// State exposed to the result-page UI after every attempt.
#[derive(Debug, Clone)]
pub struct PollSnapshot {
    pub status: OrderStatus,
    pub order: Option<Order>,
    pub is_polling: bool,
    pub attempts: u32,
    pub error: Option<String>,
}

impl PollSnapshot {
    fn initial() -> Self {
        Self {
            status: OrderStatus::Pending,
            order: None,
            is_polling: true,
            attempts: 0,
            error: None,
        }
    }

    fn missing_order_id() -> Self {
        Self {
            status: OrderStatus::Unknown,
            order: None,
            is_polling: false,
            attempts: 0,
            error: Some("missing order id".to_string()),
        }
    }
}

/// Owned polling loop over an [`OrderQueryGateway`]. One instance per
/// mounted result view; exactly one query in flight at a time.
pub struct OrderStatusPoller {
    gateway: Arc<dyn OrderQueryGateway>,
    config: PollerConfig,
    shutdown_tx: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
}

impl OrderStatusPoller {
    pub fn new(gateway: Arc<dyn OrderQueryGateway>, config: PollerConfig) -> Self {
        Self {
            gateway,
            config,
            shutdown_tx: None,
            handle: None,
        }
    }

    /// Start polling. Issues an immediate first query, then one per
    /// interval tick, stopping on a terminal status or once the attempt cap
    /// is reached. A blank order id never starts the loop: the returned
    /// receiver already holds a failed snapshot.
    pub fn start(&mut self, order_id: &str) -> watch::Receiver<PollSnapshot> {
        if order_id.trim().is_empty() {
            let (_tx, rx) = watch::channel(PollSnapshot::missing_order_id());
            return rx;
        }

        let (snapshot_tx, snapshot_rx) = watch::channel(PollSnapshot::initial());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.shutdown_tx = Some(shutdown_tx);

        let gateway = Arc::clone(&self.gateway);
        let config = self.config.clone();
        let order_id = order_id.to_string();

        self.handle = Some(tokio::spawn(run_loop(
            gateway,
            config,
            order_id,
            snapshot_tx,
            shutdown_rx,
        )));

        snapshot_rx
    }

    /// Cancel the loop and wait for it to wind down. Deterministic: after
    /// this returns, no further queries are issued. Safe to call when the
    /// loop already finished on its own.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for OrderStatusPoller {
    fn drop(&mut self) {
        // Teardown without an explicit stop() still cancels the timer task.
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run_loop(
    gateway: Arc<dyn OrderQueryGateway>,
    config: PollerConfig,
    order_id: String,
    snapshot_tx: watch::Sender<PollSnapshot>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    info!(
        order_id = %order_id,
        interval_secs = config.interval.as_secs(),
        max_attempts = config.max_attempts,
        "order status poll started"
    );

    // First tick completes immediately, giving the spec'd immediate query.
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut attempts: u32 = 0;
    let mut last_status = OrderStatus::Pending;
    let mut last_order: Option<Order> = None;

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    info!(order_id = %order_id, attempts, "order status poll cancelled");
                    break;
                }
            }
            _ = ticker.tick() => {
                attempts += 1;
                match gateway.fetch_order(&order_id).await {
                    Ok(Some(order)) => {
                        last_status = order.status;
                        last_order = Some(order);
                    }
                    Ok(None) => {
                        warn!(order_id = %order_id, attempts, "order not found yet");
                    }
                    Err(e) => {
                        // Transient failures are tolerated up to the cap.
                        warn!(order_id = %order_id, attempts, error = %e, "order status query failed");
                    }
                }

                let terminal = last_status.is_terminal();
                let exhausted = attempts >= config.max_attempts;
                let _ = snapshot_tx.send(PollSnapshot {
                    status: last_status,
                    order: last_order.clone(),
                    is_polling: !(terminal || exhausted),
                    attempts,
                    error: None,
                });

                if terminal {
                    info!(order_id = %order_id, status = %last_status, attempts, "order reached terminal status");
                    break;
                }
                if exhausted {
                    info!(order_id = %order_id, attempts, "order status poll exhausted, order still settling");
                    break;
                }
            }
        }
    }

    snapshot_tx.send_modify(|s| s.is_polling = false);
}
