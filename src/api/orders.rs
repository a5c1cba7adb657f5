//! Read-only order lookup backing the result page's status polling.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::error;

use crate::api::AppState;

/// GET /api/orders/{order_id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> impl IntoResponse {
    match state.orders.fetch_order(&order_id).await {
        Ok(Some(order)) => (StatusCode::OK, Json(serde_json::json!(order))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "order_not_found",
                "order_id": order_id,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(order_id = %order_id, error = %e, "order lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "order_lookup_failed",
                })),
            )
                .into_response()
        }
    }
}
