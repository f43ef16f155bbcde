//! # Stock Ledger
//!
//! The single place that writes `products.quantity`.
//!
//! ## Atomic Conditional Apply
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply_delta(product, Δ)                                                │
//! │                                                                         │
//! │  UPDATE products                                                        │
//! │     SET quantity = quantity + Δ                                         │
//! │   WHERE id = ? AND quantity + Δ >= 0      ← check and write are ONE    │
//! │  RETURNING ...                               statement                  │
//! │       │                                                                 │
//! │       ├── row returned  → Ok(StockLevel)                               │
//! │       │                                                                 │
//! │       └── no row        → SELECT quantity (same transaction)           │
//! │                              ├── no product → ProductNotFound          │
//! │                              └── quantity q → InsufficientStock {q}    │
//! │                                                                         │
//! │  Two requests racing for the last unit:                                │
//! │                                                                         │
//! │   A: UPDATE ... (holds write lock) ──► qty 1→0 ──► COMMIT              │
//! │   B: UPDATE ... (waits on lock) ─────────────────────► 0 + (−1) < 0    │
//! │                                                      → InsufficientStock│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQLite admits one writer at a time, and every transaction here opens with
//! its write statement, so applies against the same product are serialized
//! without any application-level lock.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use stockroom_core::{CoreError, StockLevel};

use crate::error::DbResult;

const APPLY_DELTA_SQL: &str = r#"
    UPDATE products
    SET
        quantity = quantity + ?2,
        updated_at = ?3
    WHERE id = ?1 AND quantity + ?2 >= 0
    RETURNING
        id AS product_id,
        name AS product_name,
        quantity,
        threshold,
        supplier_id,
        last_notification_sent
"#;

const STOCK_LEVEL_SQL: &str = r#"
    SELECT
        id AS product_id,
        name AS product_name,
        quantity,
        threshold,
        supplier_id,
        last_notification_sent
    FROM products
    WHERE id = ?1
"#;

/// Handle for standalone ledger applies.
///
/// Callers that need the stock change to commit together with another write
/// (creating or transitioning an order) use [`apply_delta_in`] on their own
/// transaction instead.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Applies `delta` to the product's quantity in its own transaction.
    ///
    /// ## Returns
    /// * `Ok(StockLevel)` - the stock after the change
    /// * `Err(DbError::Domain(ProductNotFound))`
    /// * `Err(DbError::Domain(InsufficientStock))` - nothing was written
    pub async fn apply_delta(&self, product_id: &str, delta: i64) -> DbResult<StockLevel> {
        let mut tx = self.pool.begin().await?;
        let level = apply_delta_in(&mut tx, product_id, delta).await?;
        tx.commit().await?;
        Ok(level)
    }

    /// Reads the current stock level without changing it.
    pub async fn stock_level(&self, product_id: &str) -> DbResult<Option<StockLevel>> {
        let level = sqlx::query_as::<_, StockLevel>(STOCK_LEVEL_SQL)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(level)
    }
}

/// Applies `delta` on an open connection or transaction.
///
/// On refusal nothing has been written; the caller's transaction may be
/// rolled back or continued.
pub async fn apply_delta_in(
    conn: &mut SqliteConnection,
    product_id: &str,
    delta: i64,
) -> DbResult<StockLevel> {
    debug!(product_id = %product_id, delta, "Applying stock delta");

    if delta == 0 {
        return sqlx::query_as::<_, StockLevel>(STOCK_LEVEL_SQL)
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()).into());
    }

    let applied = sqlx::query_as::<_, StockLevel>(APPLY_DELTA_SQL)
        .bind(product_id)
        .bind(delta)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?;

    if let Some(level) = applied {
        debug!(
            product_id = %product_id,
            quantity = level.quantity,
            "Stock delta applied"
        );
        return Ok(level);
    }

    let available: Option<i64> = sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;

    let err = match available {
        None => CoreError::ProductNotFound(product_id.to_string()),
        Some(available) => CoreError::InsufficientStock {
            product_id: product_id.to_string(),
            available,
            requested: -delta,
        },
    };

    debug!(product_id = %product_id, delta, error = %err, "Stock delta refused");
    Err(err.into())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::test_support::{seed_product, seed_supplier};
    use crate::{Database, DbConfig};

    async fn setup(quantity: i64) -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let supplier = seed_supplier(&db, Some("restock@acme.io")).await;
        let product = seed_product(&db, &supplier.id, quantity, 5).await;
        (db, product.id)
    }

    #[tokio::test]
    async fn test_apply_negative_delta() {
        let (db, id) = setup(10).await;

        let level = db.ledger().apply_delta(&id, -6).await.unwrap();
        assert_eq!(level.quantity, 4);
        assert_eq!(level.product_id, id);
        assert!(level.is_low_stock());
    }

    #[tokio::test]
    async fn test_apply_to_exactly_zero() {
        let (db, id) = setup(3).await;

        let level = db.ledger().apply_delta(&id, -3).await.unwrap();
        assert_eq!(level.quantity, 0);
    }

    #[tokio::test]
    async fn test_insufficient_stock_writes_nothing() {
        let (db, id) = setup(4).await;

        let err = db.ledger().apply_delta(&id, -5).await.unwrap_err();
        match err {
            DbError::Domain(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 4);
                assert_eq!(requested, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        let level = db.ledger().stock_level(&id).await.unwrap().unwrap();
        assert_eq!(level.quantity, 4);
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let (db, _) = setup(4).await;

        let err = db.ledger().apply_delta("missing", -1).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(_))));

        let err = db.ledger().apply_delta("missing", 0).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_zero_delta_reads_only() {
        let (db, id) = setup(7).await;
        let level = db.ledger().apply_delta(&id, 0).await.unwrap();
        assert_eq!(level.quantity, 7);
    }

    #[tokio::test]
    async fn test_rollback_discards_apply() {
        let (db, id) = setup(10).await;

        let mut tx = db.pool().begin().await.unwrap();
        let level = apply_delta_in(&mut tx, &id, -10).await.unwrap();
        assert_eq!(level.quantity, 0);
        tx.rollback().await.unwrap();

        let level = db.ledger().stock_level(&id).await.unwrap().unwrap();
        assert_eq!(level.quantity, 10);
    }

    #[tokio::test]
    async fn test_concurrent_applies_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("ledger.db")).max_connections(5))
            .await
            .unwrap();
        let supplier = seed_supplier(&db, None).await;
        let product = seed_product(&db, &supplier.id, 7, 0).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = db.ledger();
            let id = product.id.clone();
            handles.push(tokio::spawn(async move { ledger.apply_delta(&id, -1).await }));
        }

        let mut ok = 0;
        let mut refused = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(DbError::Domain(CoreError::InsufficientStock { .. })) => refused += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(ok, 7);
        assert_eq!(refused, 1);
        let level = db.ledger().stock_level(&product.id).await.unwrap().unwrap();
        assert_eq!(level.quantity, 0);
    }
}
