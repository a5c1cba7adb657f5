//! Deterministic polling-loop tests using paused tokio time.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use lexportal_payments::orders::status::OrderStatus;
use lexportal_payments::orders::types::Order;
use lexportal_payments::poller::gateway::{GatewayError, OrderQueryGateway};
use lexportal_payments::poller::{OrderStatusPoller, PollerConfig};

fn order(id: &str, status: OrderStatus) -> Order {
    Order {
        id: id.to_string(),
        status,
        amount: None,
        currency: "RON".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Replays a script of responses, then repeats the last one forever.
struct ScriptedGateway {
    script: Mutex<VecDeque<Result<Option<Order>, String>>>,
    last: Mutex<Result<Option<Order>, String>>,
    calls: AtomicU32,
}

impl ScriptedGateway {
    fn new(script: Vec<Result<Option<Order>, String>>) -> Self {
        let script: VecDeque<_> = script.into();
        let last = script.back().cloned().unwrap_or(Ok(None));
        Self {
            script: Mutex::new(script),
            last: Mutex::new(last),
            calls: AtomicU32::new(0),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderQueryGateway for ScriptedGateway {
    async fn fetch_order(&self, _order_id: &str) -> Result<Option<Order>, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut script = self.script.lock().unwrap();
            match script.pop_front() {
                Some(step) => step,
                None => self.last.lock().unwrap().clone(),
            }
        };
        next.map_err(GatewayError::Transport)
    }
}

fn config() -> PollerConfig {
    PollerConfig {
        interval: Duration::from_secs(10),
        max_attempts: 30,
    }
}

async fn run_to_completion(
    rx: &mut tokio::sync::watch::Receiver<lexportal_payments::poller::PollSnapshot>,
) {
    while rx.changed().await.is_ok() {}
}

#[tokio::test(start_paused = true)]
async fn stops_on_terminal_status_after_exactly_three_queries() {
    let gateway = Arc::new(ScriptedGateway::new(vec![
        Ok(Some(order("ord_1", OrderStatus::Pending))),
        Ok(Some(order("ord_1", OrderStatus::Pending))),
        Ok(Some(order("ord_1", OrderStatus::Succeeded))),
    ]));
    let mut poller = OrderStatusPoller::new(gateway.clone(), config());
    let mut rx = poller.start("ord_1");

    run_to_completion(&mut rx).await;

    let snapshot = rx.borrow();
    assert_eq!(gateway.calls(), 3);
    assert_eq!(snapshot.status, OrderStatus::Succeeded);
    assert_eq!(snapshot.attempts, 3);
    assert!(!snapshot.is_polling);
    assert_eq!(
        snapshot.order.as_ref().map(|o| o.id.as_str()),
        Some("ord_1")
    );
}

#[tokio::test(start_paused = true)]
async fn exhaustion_stops_after_the_attempt_cap_without_an_error() {
    let gateway = Arc::new(ScriptedGateway::new(vec![Ok(Some(order(
        "ord_2",
        OrderStatus::Pending,
    )))]));
    let mut poller = OrderStatusPoller::new(gateway.clone(), config());
    let mut rx = poller.start("ord_2");

    run_to_completion(&mut rx).await;

    let snapshot = rx.borrow();
    assert_eq!(gateway.calls(), 30);
    assert_eq!(snapshot.attempts, 30);
    assert_eq!(snapshot.status, OrderStatus::Pending, "still processing, not failed");
    assert!(!snapshot.is_polling);
    assert!(snapshot.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn transient_query_failures_do_not_stop_the_loop() {
    let gateway = Arc::new(ScriptedGateway::new(vec![
        Err("connection refused".to_string()),
        Err("connection refused".to_string()),
        Ok(Some(order("ord_3", OrderStatus::Failed))),
    ]));
    let mut poller = OrderStatusPoller::new(gateway.clone(), config());
    let mut rx = poller.start("ord_3");

    run_to_completion(&mut rx).await;

    let snapshot = rx.borrow();
    assert_eq!(gateway.calls(), 3);
    assert_eq!(snapshot.status, OrderStatus::Failed);
    assert!(!snapshot.is_polling);
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_the_timer_and_no_further_queries_happen() {
    let gateway = Arc::new(ScriptedGateway::new(vec![Ok(Some(order(
        "ord_4",
        OrderStatus::Pending,
    )))]));
    let mut poller = OrderStatusPoller::new(gateway.clone(), config());
    let mut rx = poller.start("ord_4");

    // Wait for the immediate first attempt, then tear the view down.
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow().attempts, 1);
    poller.stop().await;

    let calls_at_stop = gateway.calls();
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(gateway.calls(), calls_at_stop, "no queries after cancellation");
    assert!(!rx.borrow().is_polling);
}

#[tokio::test(start_paused = true)]
async fn missing_order_id_never_starts_polling() {
    let gateway = Arc::new(ScriptedGateway::new(vec![Ok(Some(order(
        "ord_5",
        OrderStatus::Pending,
    )))]));
    let mut poller = OrderStatusPoller::new(gateway.clone(), config());
    let rx = poller.start("   ");

    let snapshot = rx.borrow();
    assert_eq!(gateway.calls(), 0);
    assert!(!snapshot.is_polling);
    assert!(snapshot.error.is_some());
    assert_eq!(snapshot.status, OrderStatus::Unknown);
}
