use async_trait::async_trait;
use thiserror::Error;

use crate::orders::types::Order;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("order query transport error: {0}")]
    Transport(String),
    #[error("order query returned unexpected status {status}")]
    UnexpectedStatus { status: u16 },
    #[error("order query returned an undecodable body: {0}")]
    Decode(String),
}

/// Read-only view of the order store, possibly stale: the settlement
/// backend updates orders asynchronously relative to the browser redirect.
/// No retries live here; the poller owns the retry budget.
#[async_trait]
pub trait OrderQueryGateway: Send + Sync {
    async fn fetch_order(&self, order_id: &str) -> Result<Option<Order>, GatewayError>;
}

/// HTTP implementation used by the result page client, hitting the
/// service's own order endpoint.
pub struct HttpOrderGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrderGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl OrderQueryGateway for HttpOrderGateway {
    async fn fetch_order(&self, order_id: &str) -> Result<Option<Order>, GatewayError> {
        let url = format!("{}/api/orders/{}", self.base_url, order_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        match response.status().as_u16() {
            404 => Ok(None),
            200 => {
                let order = response
                    .json::<Order>()
                    .await
                    .map_err(|e| GatewayError::Decode(e.to_string()))?;
                Ok(Some(order))
            }
            status => Err(GatewayError::UnexpectedStatus { status }),
        }
    }
}
