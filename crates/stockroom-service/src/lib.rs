//! # stockroom-service: Order Lifecycle and Supplier Alerts
//!
//! Wires the pure rules of `stockroom-core` to the storage of `stockroom-db`
//! and adds the parts that need a runtime: the notification worker, the
//! clock, and configuration.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockroom Service                                │
//! │                                                                         │
//! │  request layer (CLI, HTTP, ...)                                        │
//! │       │ create_order / transition_order / delete_order / get_stats     │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                         Stockroom                                │  │
//! │  │   validate → plan → one transaction (order write + ledger apply) │  │
//! │  └──────────────┬───────────────────────────────┬───────────────────┘  │
//! │                 │ StockLevel                    │                       │
//! │                 ▼                               ▼                       │
//! │  ┌────────────────────────┐        ┌─────────────────────────┐         │
//! │  │    LowStockMonitor     │        │      stockroom-db       │         │
//! │  │  throttle, supplier,   │───────►│  Stock Ledger, repos    │         │
//! │  │  claim timestamp       │        └─────────────────────────┘         │
//! │  └──────────┬─────────────┘                                            │
//! │             │ try_send                                                  │
//! │             ▼                                                           │
//! │  ┌────────────────────────┐                                            │
//! │  │ NotificationDispatcher │──► LogNotifier | WebhookNotifier           │
//! │  │   (background worker)  │     failures: warn! and forget            │
//! │  └────────────────────────┘                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`service`] - `Stockroom`: construction, suppliers, products, stats
//! - [`orders`] - Order lifecycle operations
//! - [`alerts`] - Low-stock check after each stock change
//! - [`notifier`] - Supplier notifier trait, implementations, dispatcher
//! - [`clock`] - Injectable time source
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Service error types
//!
//! ## Example
//!
//! ```rust,ignore
//! use stockroom_service::{Stockroom, StockroomConfig};
//!
//! let config = StockroomConfig::load(None)?;
//! let stockroom = Stockroom::open(&config).await?;
//! let stats = stockroom.get_stats().await?;
//! stockroom.shutdown().await;
//! ```

pub mod alerts;
pub mod clock;
pub mod config;
pub mod error;
pub mod notifier;
pub mod orders;
pub mod service;


pub use alerts::LowStockMonitor;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{NotifierMode, StockroomConfig};
pub use error::{ServiceError, ServiceResult};
pub use notifier::{
    LogNotifier, LowStockAlert, NotificationDispatcher, NotifyError, SupplierNotifier,
    WebhookConfig, WebhookNotifier,
};
pub use orders::TransitionOutcome;
pub use service::Stockroom;
