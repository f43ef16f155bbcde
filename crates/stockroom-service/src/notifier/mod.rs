//! # Supplier Notifier
//!
//! Low-stock alerts to suppliers. Delivery is fire-and-forget: the order path
//! hands an alert to the [`NotificationDispatcher`] and moves on, and whatever
//! happens to it afterwards is only logged.
//!
//! ```text
//! ┌──────────────┐  try_send   ┌──────────────────┐  notify   ┌────────────────────┐
//! │ LowStock     │────────────►│ bounded queue    │──────────►│ SupplierNotifier   │
//! │ Monitor      │  (never     │ + worker task    │           │  LogNotifier       │
//! │              │   awaits)   │                  │  Err? ──► │  WebhookNotifier   │
//! └──────────────┘             └──────────────────┘  warn!    └────────────────────┘
//! ```

mod dispatcher;
mod log;
mod webhook;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use dispatcher::{NotificationDispatcher, NotificationWorker};
pub use log::LogNotifier;
pub use webhook::{WebhookConfig, WebhookNotifier};

// =============================================================================
// Alert
// =============================================================================

/// One low-stock message for one supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockAlert {
    pub supplier_email: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
}

impl LowStockAlert {
    pub fn subject(&self) -> String {
        format!("Low Stock Alert: {}", self.product_name)
    }

    pub fn body(&self) -> String {
        format!(
            "Stock for {} is low. Current stock: {}. Please restock soon.",
            self.product_name, self.quantity
        )
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Delivery failures. Logged by the dispatcher, never returned to callers.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail relay rejected the alert with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Notifier misconfigured: {0}")]
    Config(String),
}

// =============================================================================
// Notifier Trait
// =============================================================================

#[async_trait]
pub trait SupplierNotifier: Send + Sync {
    /// Delivers one alert. Implementations do not retry.
    async fn notify(&self, alert: &LowStockAlert) -> Result<(), NotifyError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_message() {
        let alert = LowStockAlert {
            supplier_email: "orders@acme.io".into(),
            product_id: "p-1".into(),
            product_name: "Hex Bolt M6".into(),
            quantity: 4,
        };
        assert_eq!(alert.subject(), "Low Stock Alert: Hex Bolt M6");
        assert_eq!(
            alert.body(),
            "Stock for Hex Bolt M6 is low. Current stock: 4. Please restock soon."
        );
    }
}
