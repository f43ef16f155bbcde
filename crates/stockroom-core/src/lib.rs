//! # stockroom-core: Pure Domain Logic for Stockroom
//!
//! Everything in this crate is deterministic: no database, no network, no
//! wall clock. Callers pass `now` in explicitly so cooldown decisions can be
//! tested at any instant.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stockroom Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 stockroom CLI / embedding app                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   stockroom-service: order lifecycle, notifier, reporter        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ stockroom-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ lifecycle │  │   stock   │  │ validation│  │   │
//! │  │   │  Product  │  │  issued ⇄ │  │ StockLevel│  │   rules   │  │   │
//! │  │   │   Order   │  │  returned │  │ Throttle  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        stockroom-db: SQLite repositories, Stock Ledger          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Supplier, Order, pagination)
//! - [`money`] - Integer-cent money
//! - [`lifecycle`] - Order status state machine and stock deltas
//! - [`stock`] - Stock snapshots and the low-stock notification throttle
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockroom_core::lifecycle::{plan_transition, StatusChange};
//! use stockroom_core::OrderStatus;
//!
//! // Returning an issued order of 4 puts 4 units back on the shelf
//! let change = plan_transition(OrderStatus::Issued, OrderStatus::Returned, 4);
//! assert_eq!(change.delta(), 4);
//!
//! // Asking for the state the order is already in changes nothing
//! let change = plan_transition(OrderStatus::Issued, OrderStatus::Issued, 4);
//! assert_eq!(change, StatusChange::Unchanged);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod money;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use lifecycle::{plan_transition, StatusChange};
pub use money::Money;
pub use stock::{NotificationThrottle, StockLevel};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Threshold given to a product when none is supplied at creation.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Minimum gap between two low-stock notifications for the same product.
pub const NOTIFICATION_COOLDOWN_HOURS: i64 = 24;

/// Page size used when a listing request does not name one.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// Upper bound on any listing page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Largest quantity a single order or restock may carry.
///
/// Keeps `quantity * price_per_item` comfortably inside `i64` cents.
pub const MAX_ORDER_QUANTITY: i64 = 1_000_000;
