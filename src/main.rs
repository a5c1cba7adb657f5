use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use lexportal_payments::api::{self, AppState};
use lexportal_payments::config::AppConfig;
use lexportal_payments::database::{self, order_repository::OrderRepository};
use lexportal_payments::database::webhook_log_repository::WebhookLogRepository;
use lexportal_payments::logging::init_tracing;
use lexportal_payments::services::callback_processor::CallbackProcessor;
use lexportal_payments::services::redirect::RedirectComposer;

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    config.validate()?;
    init_tracing(&config.logging);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "starting payment callback service"
    );

    let db_pool = database::init_pool_from_config(&config.database)
        .await
        .map_err(|e| {
            error!("failed to initialize database pool: {}", e);
            anyhow::anyhow!(e)
        })?;

    let audit_store = Arc::new(WebhookLogRepository::new(db_pool.clone()));
    let order_repo = Arc::new(OrderRepository::new(db_pool.clone()));
    let processor = Arc::new(CallbackProcessor::new(
        audit_store,
        RedirectComposer::new(config.payments.result_page_path.clone()),
        config.payments.default_currency.clone(),
    ));

    let state = AppState {
        processor,
        orders: order_repo,
        db_pool: Some(db_pool),
    };

    let app = api::router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http()),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}
