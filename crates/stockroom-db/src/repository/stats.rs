//! # Dashboard Aggregates
//!
//! Four independent reads. They are not wrapped in a transaction, so under
//! concurrent writes the counts may come from slightly different instants.

use sqlx::SqlitePool;

use stockroom_core::{DashboardStats, OrderStatus};

use crate::error::DbResult;

/// Read-only aggregate queries.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StatsRepository { pool }
    }

    /// Sum of `total_price_cents` over issued orders; 0 when there are none.
    pub async fn issued_revenue_cents(&self) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_price_cents), 0) FROM orders WHERE status = ?1",
        )
        .bind(OrderStatus::Issued)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    pub async fn dashboard(&self) -> DbResult<DashboardStats> {
        let product_count = self.count("products").await?;
        let order_count = self.count("orders").await?;
        let supplier_count = self.count("suppliers").await?;
        let total_revenue_cents = self.issued_revenue_cents().await?;

        Ok(DashboardStats {
            product_count,
            order_count,
            supplier_count,
            total_revenue_cents,
        })
    }

    async fn count(&self, table: &'static str) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{new_order, seed_product, seed_supplier};
    use crate::{Database, DbConfig};
    use stockroom_core::OrderStatus;

    #[tokio::test]
    async fn test_empty_dashboard() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let stats = db.stats().dashboard().await.unwrap();
        assert_eq!(stats.product_count, 0);
        assert_eq!(stats.order_count, 0);
        assert_eq!(stats.supplier_count, 0);
        assert_eq!(stats.total_revenue_cents, 0);
    }

    #[tokio::test]
    async fn test_revenue_counts_issued_only() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let supplier = seed_supplier(&db, None).await;
        let product = seed_product(&db, &supplier.id, 100, 5).await;

        let mut issued = new_order(&product.id, 1, OrderStatus::Issued);
        issued.total_price_cents = 100;
        db.orders().create(&issued, -1).await.unwrap();

        let mut returned = new_order(&product.id, 1, OrderStatus::Returned);
        returned.total_price_cents = 50;
        db.orders().create(&returned, 0).await.unwrap();

        let stats = db.stats().dashboard().await.unwrap();
        assert_eq!(stats.total_revenue_cents, 100);
        assert_eq!(stats.order_count, 2);
        assert_eq!(stats.product_count, 1);
        assert_eq!(stats.supplier_count, 1);
    }
}
