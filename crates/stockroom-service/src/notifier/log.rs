use async_trait::async_trait;
use tracing::info;

use super::{LowStockAlert, NotifyError, SupplierNotifier};

/// Writes alerts to the log instead of sending them. The default notifier.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    from_address: String,
}

impl LogNotifier {
    pub fn new(from_address: impl Into<String>) -> Self {
        LogNotifier {
            from_address: from_address.into(),
        }
    }
}

#[async_trait]
impl SupplierNotifier for LogNotifier {
    async fn notify(&self, alert: &LowStockAlert) -> Result<(), NotifyError> {
        info!(
            from = %self.from_address,
            to = %alert.supplier_email,
            product_id = %alert.product_id,
            subject = %alert.subject(),
            body = %alert.body(),
            "Low stock alert"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
