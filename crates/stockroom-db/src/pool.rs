//! # Connection Pool
//!
//! ```text
//!   DbConfig ──► Database::new ──► SqlitePool ──► run_migrations
//!                                      │
//!          ┌──────────────┬────────────┼─────────────┬──────────────┐
//!          ▼              ▼            ▼             ▼              ▼
//!       ledger()     products()   suppliers()    orders()       stats()
//! ```
//!
//! Readers run side by side under WAL. Writers line up on SQLite's single
//! write lock and wait up to `busy_timeout` for it; that line is what
//! serializes Stock Ledger applies across connections.

use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::ledger::StockLedger;
use crate::migrations;
use crate::repository::order::OrderRepository;
use crate::repository::product::ProductRepository;
use crate::repository::stats::StatsRepository;
use crate::repository::supplier::SupplierRepository;

/// Where the store lives and how the pool behaves.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/stockroom/stockroom.db")
///     .max_connections(5)
///     .busy_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// `None` keeps everything in memory for the life of the pool.
    pub path: Option<PathBuf>,
    pub max_connections: u32,
    /// How long a writer waits for the write lock before giving up.
    pub busy_timeout: Duration,
    /// How long a caller waits for a free connection.
    pub acquire_timeout: Duration,
    pub run_migrations: bool,
}

impl DbConfig {
    /// A file-backed store; the file is created on first open.
    pub fn new(path: impl AsRef<Path>) -> Self {
        DbConfig {
            path: Some(path.as_ref().to_path_buf()),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
            acquire_timeout: Duration::from_secs(30),
            run_migrations: true,
        }
    }

    /// A private in-memory store, used by tests.
    ///
    /// The data belongs to a single connection, so the pool holds exactly one
    /// and never recycles it.
    pub fn in_memory() -> Self {
        DbConfig {
            path: None,
            max_connections: 1,
            ..DbConfig::new("")
        }
    }

    pub fn max_connections(self, max_connections: u32) -> Self {
        DbConfig {
            max_connections,
            ..self
        }
    }

    pub fn busy_timeout(self, busy_timeout: Duration) -> Self {
        DbConfig {
            busy_timeout,
            ..self
        }
    }

    pub fn acquire_timeout(self, acquire_timeout: Duration) -> Self {
        DbConfig {
            acquire_timeout,
            ..self
        }
    }

    pub fn skip_migrations(self) -> Self {
        DbConfig {
            run_migrations: false,
            ..self
        }
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = match &self.path {
            Some(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal),
            None => SqliteConnectOptions::new().in_memory(true),
        };

        options.foreign_keys(true).busy_timeout(self.busy_timeout)
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout);

        if self.path.is_none() {
            // Dropping the only connection would drop the data with it
            options.idle_timeout(None).max_lifetime(None)
        } else {
            options
        }
    }
}

/// Shared handle to the store. Clones share one pool.
///
/// ```rust,ignore
/// let level = db.ledger().apply_delta(&product_id, -3).await?;
/// let page = db.orders().list(PageRequest::default()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        match &config.path {
            Some(path) => info!(path = %path.display(), "Opening database"),
            None => info!("Opening in-memory database"),
        }

        let pool = config
            .pool_options()
            .connect_with(config.connect_options())
            .await?;

        debug!(
            max_connections = config.max_connections,
            busy_timeout_ms = config.busy_timeout.as_millis() as u64,
            "Pool ready"
        );

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    /// Safe to call repeatedly; applied migrations are skipped.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The only writer of `products.quantity`.
    pub fn ledger(&self) -> StockLedger {
        StockLedger::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn suppliers(&self) -> SupplierRepository {
        SupplierRepository::new(self.pool.clone())
    }

    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    pub fn stats(&self) -> StatsRepository {
        StatsRepository::new(self.pool.clone())
    }

    /// Waits for checked-out connections, then closes the pool.
    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        let (embedded, applied) = migrations::migration_status(db.pool()).await.unwrap();
        assert!(embedded >= 1);
        assert_eq!(embedded, applied);

        db.run_migrations().await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stockroom.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        sqlx::query(
            "INSERT INTO suppliers (id, name, contact_number, created_at, updated_at) \
             VALUES ('s-1', 'Acme', '555-0100', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        db.close().await;
        assert!(!db.health_check().await);

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM suppliers")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_skip_migrations_leaves_schema_empty() {
        let db = Database::new(DbConfig::in_memory().skip_migrations())
            .await
            .unwrap();
        assert!(sqlx::query("SELECT 1 FROM products")
            .execute(db.pool())
            .await
            .is_err());
    }

    #[test]
    fn test_builder_overrides() {
        let config = DbConfig::new("/tmp/stockroom.db")
            .max_connections(10)
            .busy_timeout(Duration::from_secs(1))
            .acquire_timeout(Duration::from_secs(2));

        assert_eq!(config.path, Some(PathBuf::from("/tmp/stockroom.db")));
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.busy_timeout, Duration::from_secs(1));
        assert_eq!(config.acquire_timeout, Duration::from_secs(2));
        assert!(config.run_migrations);

        let memory = DbConfig::in_memory();
        assert_eq!(memory.path, None);
        assert_eq!(memory.max_connections, 1);
    }
}
