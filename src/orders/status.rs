use serde::{Deserialize, Serialize};

/// Canonical order state. Everything the rest of the service does with a
/// provider callback or a polled order row goes through this enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Succeeded,
    Failed,
    Cancelled,
    Unknown,
}

impl OrderStatus {
    /// Terminal states stop client polling; `Pending` and `Unknown` do not.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Succeeded | OrderStatus::Failed | OrderStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Succeeded => "succeeded",
            OrderStatus::Failed => "failed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Unknown => "unknown",
        }
    }

    /// Map the payment provider's status vocabulary onto the canonical enum.
    ///
    /// Unrecognized values deliberately map to `Pending` rather than a
    /// terminal state: Netopia has introduced new status strings before, and
    /// mis-mapping one to a terminal state would stop the result page from
    /// polling while the order is still settling. Total function, never
    /// panics.
    pub fn from_provider(raw: Option<&str>) -> OrderStatus {
        let normalized = match raw {
            Some(s) => s.trim().to_lowercase(),
            None => return OrderStatus::Pending,
        };
        match normalized.as_str() {
            "" => OrderStatus::Pending,
            "confirmed" | "paid" => OrderStatus::Succeeded,
            "pending" => OrderStatus::Pending,
            "cancelled" => OrderStatus::Cancelled,
            "failed" | "error" => OrderStatus::Failed,
            _ => OrderStatus::Pending,
        }
    }

    /// Parse a status string persisted by the order store. Unlike provider
    /// input, drift here surfaces as `Unknown` so the result page can show a
    /// distinct state instead of pretending the order is still pending.
    pub fn from_stored(raw: &str) -> OrderStatus {
        match raw.trim().to_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "succeeded" => OrderStatus::Succeeded,
            "failed" => OrderStatus::Failed,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Unknown,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
