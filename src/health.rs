//! Liveness and readiness endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use crate::api::AppState;
use crate::database;

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// GET /health/live
pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "alive")
}

/// GET /health/ready — ready only when the database pool answers.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match &state.db_pool {
        Some(pool) => match database::health_check(pool).await {
            Ok(()) => (
                StatusCode::OK,
                Json(serde_json::json!({"status": "ready", "database": "ok"})),
            ),
            Err(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"status": "not_ready", "database": e.to_string()})),
            ),
        },
        None => (
            StatusCode::OK,
            Json(serde_json::json!({"status": "ready", "database": "skipped"})),
        ),
    }
}
