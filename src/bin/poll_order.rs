//! Operational helper: poll one order until it settles or the attempt
//! budget runs out, printing each snapshot. Mirrors what the result page
//! does in the browser, which makes it handy for verifying a stuck order
//! from the command line.
//!
//! Usage: poll-order <order-id> [base-url]

use std::sync::Arc;

use lexportal_payments::poller::gateway::HttpOrderGateway;
use lexportal_payments::poller::{OrderStatusPoller, PollerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let order_id = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: poll-order <order-id> [base-url]"))?;
    let base_url = args
        .next()
        .unwrap_or_else(|| "http://127.0.0.1:8000".to_string());

    let gateway = Arc::new(HttpOrderGateway::new(base_url));
    let mut poller = OrderStatusPoller::new(gateway, PollerConfig::from_env());
    let mut rx = poller.start(&order_id);

    while rx.changed().await.is_ok() {
        let snapshot = rx.borrow().clone();
        println!(
            "attempt {:>2}: status={} polling={}",
            snapshot.attempts, snapshot.status, snapshot.is_polling
        );
        if let Some(error) = &snapshot.error {
            eprintln!("error: {error}");
        }
    }

    let final_snapshot = rx.borrow().clone();
    if final_snapshot.status.is_terminal() {
        println!("order {} settled as {}", order_id, final_snapshot.status);
    } else {
        println!(
            "order {} still {} after {} attempt(s)",
            order_id, final_snapshot.status, final_snapshot.attempts
        );
    }

    Ok(())
}
