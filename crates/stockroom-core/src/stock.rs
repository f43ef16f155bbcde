//! # Stock Levels and the Notification Throttle
//!
//! ## When Does a Supplier Hear About Low Stock?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  After every successful Stock Ledger apply:                             │
//! │                                                                         │
//! │   quantity <= threshold ? ──no──► nothing                               │
//! │          │ yes                                                          │
//! │          ▼                                                              │
//! │   last_notification_sent is None                                        │
//! │     OR now − last > cooldown ? ──no──► nothing (still cooling down)    │
//! │          │ yes                                                          │
//! │          ▼                                                              │
//! │   alert supplier, then mark_notified(now)                               │
//! │                                                                         │
//! │  T0: fires   T0+1h: silent   T0+25h: fires   (cooldown 24h)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::NOTIFICATION_COOLDOWN_HOURS;

/// `quantity <= threshold`.
#[inline]
pub fn is_low_stock(quantity: i64, threshold: i64) -> bool {
    quantity <= threshold
}

// =============================================================================
// Stock Level
// =============================================================================

/// A product's stock as it stands right after a ledger apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockLevel {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub threshold: i64,
    pub supplier_id: String,
    pub last_notification_sent: Option<DateTime<Utc>>,
}

impl StockLevel {
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        is_low_stock(self.quantity, self.threshold)
    }
}

// =============================================================================
// Notification Throttle
// =============================================================================

/// Decides whether a low-stock alert is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationThrottle {
    cooldown: Duration,
}

impl NotificationThrottle {
    pub fn new(cooldown: Duration) -> Self {
        NotificationThrottle { cooldown }
    }

    pub fn with_cooldown_hours(hours: i64) -> Self {
        NotificationThrottle::new(Duration::hours(hours))
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Low stock and no alert within the cooldown window.
    ///
    /// The window is exclusive: an alert exactly `cooldown` ago still
    /// suppresses this one.
    pub fn should_notify(&self, level: &StockLevel, now: DateTime<Utc>) -> bool {
        if !level.is_low_stock() {
            return false;
        }

        match level.last_notification_sent {
            None => true,
            Some(last) => now.signed_duration_since(last) > self.cooldown,
        }
    }
}

impl Default for NotificationThrottle {
    fn default() -> Self {
        NotificationThrottle::with_cooldown_hours(NOTIFICATION_COOLDOWN_HOURS)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn level(quantity: i64, last: Option<DateTime<Utc>>) -> StockLevel {
        StockLevel {
            product_id: "p-1".to_string(),
            product_name: "Widget".to_string(),
            quantity,
            threshold: 5,
            supplier_id: "s-1".to_string(),
            last_notification_sent: last,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(is_low_stock(5, 5));
        assert!(is_low_stock(0, 5));
        assert!(!is_low_stock(6, 5));
    }

    #[test]
    fn test_not_low_never_fires() {
        let throttle = NotificationThrottle::default();
        assert!(!throttle.should_notify(&level(6, None), t0()));
    }

    #[test]
    fn test_first_low_fires() {
        let throttle = NotificationThrottle::default();
        assert!(throttle.should_notify(&level(4, None), t0()));
    }

    #[test]
    fn test_cooldown_window() {
        let throttle = NotificationThrottle::default();
        let after_first = level(3, Some(t0()));

        assert!(!throttle.should_notify(&after_first, t0() + Duration::hours(1)));
        assert!(!throttle.should_notify(&after_first, t0() + Duration::hours(24)));
        assert!(throttle.should_notify(&after_first, t0() + Duration::hours(25)));
    }

    #[test]
    fn test_custom_cooldown() {
        let throttle = NotificationThrottle::with_cooldown_hours(1);
        let lvl = level(0, Some(t0()));
        assert!(throttle.should_notify(&lvl, t0() + Duration::minutes(61)));
        assert_eq!(throttle.cooldown(), Duration::hours(1));
    }
}
