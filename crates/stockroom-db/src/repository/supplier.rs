//! # Supplier Repository
//!
//! Suppliers and their add-only `products_supplied` set.
//!
//! ```text
//! suppliers ──1:N──► supplier_products (supplier_id, product_id)
//!                     ON DELETE CASCADE from suppliers only;
//!                     deleting a product leaves its row here
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use stockroom_core::{Page, PageRequest, Supplier, SupplierPatch};

use crate::error::{DbError, DbResult};

const SUPPLIER_COLUMNS: &str =
    "id, name, contact_number, email, address, created_at, updated_at";

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Gets a supplier with its supplied-product set.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = ?1");

        let supplier = sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match supplier {
            Some(mut supplier) => {
                supplier.products_supplied = self.products_supplied(&supplier.id).await?;
                Ok(Some(supplier))
            }
            None => Ok(None),
        }
    }

    /// Lists suppliers, newest first.
    pub async fn list(&self, request: PageRequest) -> DbResult<Page<Supplier>> {
        let sql = format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers ORDER BY created_at DESC, rowid DESC LIMIT ?1 OFFSET ?2"
        );

        let mut items = sqlx::query_as::<_, Supplier>(&sql)
            .bind(i64::from(request.limit))
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await?;

        for supplier in &mut items {
            supplier.products_supplied = self.products_supplied(&supplier.id).await?;
        }

        let total = self.count().await?;
        Ok(Page::new(items, request, total))
    }

    pub async fn insert(&self, supplier: &Supplier) -> DbResult<Supplier> {
        debug!(id = %supplier.id, name = %supplier.name, "Inserting supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, name, contact_number, email, address, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_number)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier.clone())
    }

    /// Applies a partial update. Fields left `None` keep their value.
    pub async fn update(&self, id: &str, patch: &SupplierPatch) -> DbResult<Supplier> {
        debug!(id = %id, "Updating supplier");

        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                name = COALESCE(?2, name),
                contact_number = COALESCE(?3, contact_number),
                email = COALESCE(?4, email),
                address = COALESCE(?5, address),
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.contact_number)
        .bind(&patch.email)
        .bind(&patch.address)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    /// Deletes a supplier. Its products stay; their `supplier_id` dangles.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting supplier");

        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn products_supplied(&self, supplier_id: &str) -> DbResult<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT product_id FROM supplier_products WHERE supplier_id = ?1 ORDER BY rowid",
        )
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

pub fn generate_supplier_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
