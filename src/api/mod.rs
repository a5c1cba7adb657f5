pub mod callbacks;
pub mod orders;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use sqlx::PgPool;

use crate::health;
use crate::poller::gateway::OrderQueryGateway;
use crate::services::callback_processor::CallbackProcessor;

/// Shared handler state. The database pool is optional so the router can be
/// exercised in tests with trait doubles and no running Postgres.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<CallbackProcessor>,
    pub orders: Arc<dyn OrderQueryGateway>,
    pub db_pool: Option<PgPool>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/payments/callback",
            get(callbacks::handle_callback_get).post(callbacks::handle_callback_post),
        )
        .route("/api/orders/{order_id}", get(orders::get_order))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
}
