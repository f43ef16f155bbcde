//! # Order Repository
//!
//! Orders, and the two units of work that couple an order write with a
//! Stock Ledger apply.
//!
//! ## Units of Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(order, Δ)                                                       │
//! │    BEGIN                                                                │
//! │      ledger apply Δ           ── refused? → ROLLBACK, no order row     │
//! │      INSERT INTO orders                                                 │
//! │    COMMIT                                                               │
//! │                                                                         │
//! │  transition(order, from → to, Δ)                                        │
//! │    BEGIN                                                                │
//! │      UPDATE orders SET status = to                                      │
//! │        WHERE id = ? AND status = from   ── 0 rows? → ROLLBACK, Stale   │
//! │      ledger apply Δ                     ── refused? → ROLLBACK          │
//! │    COMMIT                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both transactions open with a write, so they take SQLite's writer lock
//! before reading anything.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use stockroom_core::{Order, OrderStatus, OrderView, Page, PageRequest, StockLevel};

use crate::error::{DbError, DbResult};
use crate::ledger::apply_delta_in;

const ORDER_COLUMNS: &str = r#"
    id, product_id, quantity, issued_to, purpose, issued_by,
    total_price_cents, status, created_at, updated_at
"#;

/// Result of a guarded status transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionWrite {
    /// Status and stock were both written.
    Applied {
        order: Order,
        /// `None` when the delta was zero.
        stock: Option<StockLevel>,
    },
    /// The order was no longer in the expected status. Nothing was written.
    Stale,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Lists orders newest first, with the product's current name.
    pub async fn list(&self, request: PageRequest) -> DbResult<Page<OrderView>> {
        let items = sqlx::query_as::<_, OrderView>(
            r#"
            SELECT
                o.id, o.product_id, o.quantity, o.issued_to, o.purpose, o.issued_by,
                o.total_price_cents, o.status, o.created_at, o.updated_at,
                p.name AS product_name
            FROM orders o
            LEFT JOIN products p ON p.id = o.product_id
            ORDER BY o.created_at DESC, o.rowid DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(i64::from(request.limit))
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = self.count().await?;
        Ok(Page::new(items, request, total))
    }

    /// Inserts `order` after applying `delta` to its product, atomically.
    ///
    /// ## Returns
    /// * `Ok(Some(level))` - stock moved
    /// * `Ok(None)` - `delta` was zero, only the order was written
    /// * `Err(DbError::Domain(..))` - refused by the ledger, nothing written
    pub async fn create(&self, order: &Order, delta: i64) -> DbResult<Option<StockLevel>> {
        debug!(
            id = %order.id,
            product_id = %order.product_id,
            quantity = order.quantity,
            delta,
            "Creating order"
        );

        let mut tx = self.pool.begin().await?;

        let level = if delta != 0 {
            Some(apply_delta_in(&mut tx, &order.product_id, delta).await?)
        } else {
            None
        };

        insert_in(&mut tx, order).await?;

        tx.commit().await?;
        Ok(level)
    }

    /// Moves the order from `from` to `to` and applies `delta`, atomically.
    pub async fn transition(
        &self,
        id: &str,
        from: OrderStatus,
        to: OrderStatus,
        delta: i64,
    ) -> DbResult<TransitionWrite> {
        debug!(id = %id, %from, %to, delta, "Transitioning order");

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE orders SET status = ?3, updated_at = ?4
            WHERE id = ?1 AND status = ?2
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(from)
            .bind(to)
            .bind(Utc::now())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(order) = order else {
            debug!(id = %id, expected = %from, "Order status moved underneath us");
            return Ok(TransitionWrite::Stale);
        };

        let stock = if delta != 0 {
            Some(apply_delta_in(&mut tx, &order.product_id, delta).await?)
        } else {
            None
        };

        tx.commit().await?;
        Ok(TransitionWrite::Applied { order, stock })
    }

    /// Deletes the order record. Stock is NOT restored.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn insert_in(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (
            id, product_id, quantity, issued_to, purpose, issued_by,
            total_price_cents, status, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&order.id)
    .bind(&order.product_id)
    .bind(order.quantity)
    .bind(&order.issued_to)
    .bind(&order.purpose)
    .bind(&order.issued_by)
    .bind(order.total_price_cents)
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{new_order, seed_product, seed_supplier};
    use crate::{Database, DbConfig};
    use stockroom_core::CoreError;

    async fn setup(quantity: i64) -> (Database, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let supplier = seed_supplier(&db, None).await;
        let product = seed_product(&db, &supplier.id, quantity, 5).await;
        (db, product.id)
    }

    async fn quantity(db: &Database, product_id: &str) -> i64 {
        db.ledger().stock_level(product_id).await.unwrap().unwrap().quantity
    }

    #[tokio::test]
    async fn test_create_moves_stock() {
        let (db, pid) = setup(10).await;
        let order = new_order(&pid, 6, OrderStatus::Issued);

        let level = db.orders().create(&order, -6).await.unwrap().unwrap();
        assert_eq!(level.quantity, 4);
        assert_eq!(db.orders().get_by_id(&order.id).await.unwrap(), Some(order));
    }

    #[tokio::test]
    async fn test_refused_create_leaves_no_order() {
        let (db, pid) = setup(4).await;
        let order = new_order(&pid, 5, OrderStatus::Issued);

        let err = db.orders().create(&order, -5).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InsufficientStock { .. })));
        assert!(db.orders().get_by_id(&order.id).await.unwrap().is_none());
        assert_eq!(quantity(&db, &pid).await, 4);
    }

    #[tokio::test]
    async fn test_zero_delta_create() {
        let (db, pid) = setup(4).await;
        let order = new_order(&pid, 0, OrderStatus::Issued);

        assert!(db.orders().create(&order, 0).await.unwrap().is_none());
        assert_eq!(db.orders().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_transition_round_trip() {
        let (db, pid) = setup(10).await;
        let order = new_order(&pid, 3, OrderStatus::Issued);
        db.orders().create(&order, -3).await.unwrap();

        let write = db
            .orders()
            .transition(&order.id, OrderStatus::Issued, OrderStatus::Returned, 3)
            .await
            .unwrap();
        match write {
            TransitionWrite::Applied { order, stock } => {
                assert_eq!(order.status, OrderStatus::Returned);
                assert_eq!(stock.unwrap().quantity, 10);
            }
            TransitionWrite::Stale => panic!("unexpected stale write"),
        }
    }

    #[tokio::test]
    async fn test_stale_transition_writes_nothing() {
        let (db, pid) = setup(10).await;
        let order = new_order(&pid, 3, OrderStatus::Issued);
        db.orders().create(&order, -3).await.unwrap();

        let write = db
            .orders()
            .transition(&order.id, OrderStatus::Returned, OrderStatus::Issued, -3)
            .await
            .unwrap();
        assert_eq!(write, TransitionWrite::Stale);
        assert_eq!(quantity(&db, &pid).await, 7);
    }

    #[tokio::test]
    async fn test_refused_transition_rolls_back_status() {
        let (db, pid) = setup(5).await;
        let order = new_order(&pid, 5, OrderStatus::Returned);
        db.orders().create(&order, 0).await.unwrap();
        db.ledger().apply_delta(&pid, -2).await.unwrap();

        let err = db
            .orders()
            .transition(&order.id, OrderStatus::Returned, OrderStatus::Issued, -5)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InsufficientStock { .. })));

        let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Returned);
        assert_eq!(quantity(&db, &pid).await, 3);
    }

    #[tokio::test]
    async fn test_delete_keeps_stock() {
        let (db, pid) = setup(10).await;
        let order = new_order(&pid, 4, OrderStatus::Issued);
        db.orders().create(&order, -4).await.unwrap();

        db.orders().delete(&order.id).await.unwrap();
        assert_eq!(quantity(&db, &pid).await, 6);
        assert!(matches!(
            db.orders().delete(&order.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_list_joins_product_name() {
        let (db, pid) = setup(10).await;
        let order = new_order(&pid, 1, OrderStatus::Issued);
        db.orders().create(&order, -1).await.unwrap();

        let page = db.orders().list(PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].order.id, order.id);
        assert!(page.items[0].product_name.is_some());

        db.products().delete(&pid).await.unwrap();
        let page = db.orders().list(PageRequest::default()).await.unwrap();
        assert_eq!(page.items[0].product_name, None);
    }
}
