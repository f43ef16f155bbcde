//! # Product Repository
//!
//! Product CRUD, restocking, and the low-stock notification timestamp.
//!
//! Quantity changes go through the [`crate::ledger`]; this repository never
//! sets `quantity` directly except when inserting a new product.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use stockroom_core::{Page, PageRequest, Product, StockLevel};

use crate::error::{DbError, DbResult};
use crate::ledger::apply_delta_in;

const PRODUCT_COLUMNS: &str = r#"
    id, name, sku, description, category,
    quantity, threshold, total_price_cents, supplier_id,
    last_notification_sent, created_at, updated_at
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists products alphabetically.
    pub async fn list(&self, request: PageRequest) -> DbResult<Page<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name COLLATE NOCASE, id LIMIT ?1 OFFSET ?2"
        );

        let items = sqlx::query_as::<_, Product>(&sql)
            .bind(i64::from(request.limit))
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = self.count().await?;
        Ok(Page::new(items, request, total))
    }

    /// Inserts a product and records it in its supplier's supplied set.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - the supplier does not exist
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(sku = %product.sku, supplier_id = %product.supplier_id, "Inserting product");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, sku, description, category,
                quantity, threshold, total_price_cents, supplier_id,
                last_notification_sent, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.sku)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.quantity)
        .bind(product.threshold)
        .bind(product.total_price_cents)
        .bind(&product.supplier_id)
        .bind(product.last_notification_sent)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT OR IGNORE INTO supplier_products (supplier_id, product_id) VALUES (?1, ?2)",
        )
        .bind(&product.supplier_id)
        .bind(&product.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(product.clone())
    }

    /// Adds `delta` units and `added_value_cents` of stock value in one
    /// transaction.
    ///
    /// The quantity change goes through the Stock Ledger, so a negative
    /// correction larger than the shelf is refused with InsufficientStock
    /// and the value is left untouched.
    pub async fn restock(
        &self,
        id: &str,
        delta: i64,
        added_value_cents: i64,
    ) -> DbResult<StockLevel> {
        debug!(id = %id, delta, added_value_cents, "Restocking product");

        let mut tx = self.pool.begin().await?;

        let level = apply_delta_in(&mut tx, id, delta).await?;

        sqlx::query("UPDATE products SET total_price_cents = total_price_cents + ?2 WHERE id = ?1")
            .bind(id)
            .bind(added_value_cents)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(level)
    }

    /// Claims the low-stock alert slot by moving `last_notification_sent`
    /// from `observed` to `when`.
    ///
    /// Compare-and-set: returns `false` (and writes nothing) when another
    /// request already moved the timestamp, or the product is gone. Of two
    /// concurrent applies that both saw the product low, only one wins.
    pub async fn mark_notified(
        &self,
        id: &str,
        observed: Option<DateTime<Utc>>,
        when: DateTime<Utc>,
    ) -> DbResult<bool> {
        debug!(id = %id, at = %when, "Marking product notified");

        let result = sqlx::query(
            r#"
            UPDATE products SET last_notification_sent = ?3
            WHERE id = ?1 AND last_notification_sent IS ?2
            "#,
        )
        .bind(id)
        .bind(observed)
        .bind(when)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Undoes a [`mark_notified`](Self::mark_notified) claim whose alert never
    /// left the process. Only rolls back while the timestamp is still
    /// `claimed`, so a later claim is never erased.
    pub async fn release_notified(
        &self,
        id: &str,
        claimed: DateTime<Utc>,
        previous: Option<DateTime<Utc>>,
    ) -> DbResult<bool> {
        debug!(id = %id, "Releasing notification claim");

        let result = sqlx::query(
            r#"
            UPDATE products SET last_notification_sent = ?3
            WHERE id = ?1 AND last_notification_sent IS ?2
            "#,
        )
        .bind(id)
        .bind(claimed)
        .bind(previous)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Hard-deletes a product.
    ///
    /// Orders referencing it are kept, and it stays in its supplier's
    /// supplied set.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
