//! # Low-Stock Monitor
//!
//! Runs after every stock-changing apply. Decides whether the product's
//! supplier should hear about it and, if so, hands an alert to the
//! dispatcher.
//!
//! ```text
//! StockLevel ──► throttle.should_notify(level, now)? ──no──► done
//!                      │ yes
//!                      ▼
//!                supplier with an email? ──no──► warn!, done
//!                      │ yes
//!                      ▼
//!                mark_notified(observed → now) ──lost──► done
//!                      │ won
//!                      ▼
//!                dispatcher.dispatch(alert)        (never awaited)
//!                      │ dropped (queue full / worker gone)
//!                      ▼
//!                release_notified(now → observed)
//! ```
//!
//! Nothing in here can fail the order that triggered it.

use std::sync::Arc;
use tracing::{debug, info, warn};

use stockroom_core::{NotificationThrottle, StockLevel};
use stockroom_db::Database;

use crate::clock::Clock;
use crate::error::ServiceResult;
use crate::notifier::{LowStockAlert, NotificationDispatcher};

#[derive(Clone)]
pub struct LowStockMonitor {
    db: Database,
    dispatcher: NotificationDispatcher,
    throttle: NotificationThrottle,
    clock: Arc<dyn Clock>,
}

impl LowStockMonitor {
    pub fn new(
        db: Database,
        dispatcher: NotificationDispatcher,
        throttle: NotificationThrottle,
        clock: Arc<dyn Clock>,
    ) -> Self {
        LowStockMonitor {
            db,
            dispatcher,
            throttle,
            clock,
        }
    }

    /// Returns whether an alert was queued. Errors are logged, not returned.
    pub async fn check(&self, level: &StockLevel) -> bool {
        match self.try_check(level).await {
            Ok(sent) => sent,
            Err(e) => {
                warn!(?e, product_id = %level.product_id, "Low stock check failed");
                false
            }
        }
    }

    async fn try_check(&self, level: &StockLevel) -> ServiceResult<bool> {
        let now = self.clock.now();
        if !self.throttle.should_notify(level, now) {
            return Ok(false);
        }

        let Some(supplier) = self.db.suppliers().get_by_id(&level.supplier_id).await? else {
            warn!(
                product_id = %level.product_id,
                supplier_id = %level.supplier_id,
                "Product is low on stock but its supplier no longer exists"
            );
            return Ok(false);
        };

        let Some(email) = supplier.email.filter(|e| !e.trim().is_empty()) else {
            warn!(
                product_id = %level.product_id,
                supplier_id = %supplier.id,
                "Product is low on stock but its supplier has no email"
            );
            return Ok(false);
        };

        let claimed = self
            .db
            .products()
            .mark_notified(&level.product_id, level.last_notification_sent, now)
            .await?;
        if !claimed {
            debug!(product_id = %level.product_id, "Low stock alert already claimed");
            return Ok(false);
        }

        info!(
            product_id = %level.product_id,
            quantity = level.quantity,
            threshold = level.threshold,
            to = %email,
            "Dispatching low stock alert"
        );

        let queued = self.dispatcher.dispatch(LowStockAlert {
            supplier_email: email,
            product_id: level.product_id.clone(),
            product_name: level.product_name.clone(),
            quantity: level.quantity,
        });

        // No attempt will be made, so the cooldown must not start
        if !queued {
            self.db
                .products()
                .release_notified(&level.product_id, now, level.last_notification_sent)
                .await?;
        }

        Ok(queued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use stockroom_core::{Product, Supplier};
    use stockroom_db::DbConfig;

    use crate::clock::ManualClock;
    use crate::notifier::testing::RecordingNotifier;
    use crate::notifier::NotificationWorker;

    async fn low_stock_level(db: &Database) -> StockLevel {
        let now = Utc::now();
        let supplier = db
            .suppliers()
            .insert(&Supplier {
                id: "sup-1".into(),
                name: "Northwind Fasteners".into(),
                contact_number: "+1 555 0101".into(),
                email: Some("orders@northwind.example".into()),
                address: None,
                products_supplied: Vec::new(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        db.products()
            .insert(&Product {
                id: "prod-1".into(),
                name: "Hex Bolt M6".into(),
                sku: "HEX-M6".into(),
                description: None,
                category: None,
                quantity: 3,
                threshold: 10,
                total_price_cents: 750,
                supplier_id: supplier.id,
                last_notification_sent: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        db.ledger().stock_level("prod-1").await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_dropped_alert_does_not_start_cooldown() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let level = low_stock_level(&db).await;

        let (notifier, _rx) = RecordingNotifier::new();
        // Worker never runs; the single slot is taken up front
        let (_worker, dispatcher) = NotificationWorker::new(Arc::new(notifier), 1);
        assert!(dispatcher.dispatch(LowStockAlert {
            supplier_email: "other@example.io".into(),
            product_id: "prod-0".into(),
            product_name: "Washer".into(),
            quantity: 0,
        }));

        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
        ));
        let monitor = LowStockMonitor::new(
            db.clone(),
            dispatcher,
            NotificationThrottle::with_cooldown_hours(24),
            clock,
        );

        assert!(!monitor.check(&level).await);

        let after = db.ledger().stock_level("prod-1").await.unwrap().unwrap();
        assert_eq!(after.last_notification_sent, None);
    }

    #[tokio::test]
    async fn test_queued_alert_starts_cooldown() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let level = low_stock_level(&db).await;

        let (notifier, _rx) = RecordingNotifier::new();
        let (_worker, dispatcher) = NotificationWorker::new(Arc::new(notifier), 4);
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let monitor = LowStockMonitor::new(
            db.clone(),
            dispatcher,
            NotificationThrottle::with_cooldown_hours(24),
            Arc::new(ManualClock::new(at)),
        );

        assert!(monitor.check(&level).await);

        let after = db.ledger().stock_level("prod-1").await.unwrap().unwrap();
        assert_eq!(after.last_notification_sent, Some(at));
        // Same snapshot again: the claim is already taken
        assert!(!monitor.check(&level).await);
    }
}
