//! # stockroom-db: Database Layer for Stockroom
//!
//! SQLite storage through sqlx, including the Stock Ledger that owns every
//! change to a product's quantity.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Data Flow                              │
//! │                                                                         │
//! │  stockroom-service (create_order, transition_order, ...)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockroom-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  product      │    │  (embedded)  │  │   │
//! │  │   │               │◄───│  supplier     │    │              │  │   │
//! │  │   │ SqlitePool    │    │  order        │    │ 001_initial  │  │   │
//! │  │   │               │    │  stats        │    │              │  │   │
//! │  │   └───────▲───────┘    └──────┬────────┘    └──────────────┘  │   │
//! │  │           │                   │                                │   │
//! │  │           │            ┌──────▼────────┐                       │   │
//! │  │           └────────────│  StockLedger  │  quantity + Δ ≥ 0     │   │
//! │  │                        │  (ledger.rs)  │  or refuse            │   │
//! │  │                        └───────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockroom_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("stockroom.db")).await?;
//! let level = db.ledger().apply_delta(&product_id, -2).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use ledger::StockLedger;
pub use pool::{Database, DbConfig};

pub use repository::order::{generate_order_id, OrderRepository, TransitionWrite};
pub use repository::product::{generate_product_id, ProductRepository};
pub use repository::stats::StatsRepository;
pub use repository::supplier::{generate_supplier_id, SupplierRepository};
