//! # Repository Module
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stockroom-service                                                     │
//! │       │                                                                 │
//! │       │  db.orders().create(&order, -6)                                │
//! │       ▼                                                                 │
//! │  OrderRepository ──► StockLedger::apply_delta_in (same transaction)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - products, restock, notification stamp
//! - [`SupplierRepository`](supplier::SupplierRepository) - suppliers and their supplied set
//! - [`OrderRepository`](order::OrderRepository) - orders and their stock-coupled writes
//! - [`StatsRepository`](stats::StatsRepository) - dashboard aggregates

pub mod order;
pub mod product;
pub mod stats;
pub mod supplier;
