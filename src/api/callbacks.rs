//! HTTP entry point for the payment provider's asynchronous redirect.
//!
//! Netopia delivers the same redirect semantics over GET or POST, so both
//! verbs land in the same processing path. Whatever goes wrong, the browser
//! is always sent to a navigable result page, never a bare 5xx: a broken
//! payment flow must not end in a dead-end error screen.

use std::collections::HashMap;

use axum::extract::{OriginalUri, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect};
use futures::FutureExt;
use tracing::{error, info};

use crate::api::AppState;
use crate::services::audit::RequestMeta;

/// GET /api/payments/callback
pub async fn handle_callback_get(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    process(state, params, headers, uri.path().to_string()).await
}

/// POST /api/payments/callback
///
/// Query parameters and an optional form body are merged (query wins) so a
/// provider posting form-encoded fields gets identical treatment to GET.
pub async fn handle_callback_post(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    body: String,
) -> impl IntoResponse {
    let mut merged = params;
    if let Ok(form) = serde_urlencoded::from_str::<HashMap<String, String>>(&body) {
        for (key, value) in form {
            merged.entry(key).or_insert(value);
        }
    }
    process(state, merged, headers, uri.path().to_string()).await
}

async fn process(
    state: AppState,
    params: HashMap<String, String>,
    headers: HeaderMap,
    request_path: String,
) -> Redirect {
    let meta = request_meta(&headers, request_path);
    let order_id = params
        .get("orderId")
        .or_else(|| params.get("order_id"))
        .cloned();

    info!(
        order_id = order_id.as_deref().unwrap_or("missing"),
        client_ip = meta.client_ip.as_deref().unwrap_or("unknown"),
        "received payment callback"
    );

    // Catch-all safety net: a panic anywhere in the pipeline still redirects
    // to a recoverable result screen.
    let processor = state.processor.clone();
    let result = std::panic::AssertUnwindSafe(processor.process(&params, &meta))
        .catch_unwind()
        .await;

    let url = match result {
        Ok(url) => url,
        Err(panic) => {
            let detail = panic
                .downcast_ref::<String>()
                .map(String::as_str)
                .or_else(|| panic.downcast_ref::<&str>().copied())
                .unwrap_or("unknown panic");
            error!(
                order_id = order_id.as_deref().unwrap_or("missing"),
                detail = %detail,
                "critical: payment callback processing panicked"
            );
            state.processor.unexpected_error_redirect(order_id.as_deref())
        }
    };

    Redirect::to(&url)
}

fn request_meta(headers: &HeaderMap, request_path: String) -> RequestMeta {
    let client_ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        });
    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    RequestMeta {
        client_ip,
        user_agent,
        request_path,
    }
}
