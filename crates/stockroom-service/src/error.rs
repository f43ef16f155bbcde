//! # Service Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Service Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────────┐  ┌─────────────────┐  ┌─────────────────────┐ │
//! │  │  Domain (surfaced)  │  │   Concurrency   │  │   Infrastructure    │ │
//! │  │                     │  │                 │  │                     │ │
//! │  │  ProductNotFound    │  │  Conflict       │  │  Database           │ │
//! │  │  OrderNotFound      │  │                 │  │  Config             │ │
//! │  │  InsufficientStock  │  │                 │  │                     │ │
//! │  │  Validation         │  │                 │  │                     │ │
//! │  └─────────────────────┘  └─────────────────┘  └─────────────────────┘ │
//! │                                                                         │
//! │  NotifyError never appears here: notification failures stop at the    │
//! │  dispatcher and are only logged.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stockroom_core::{CoreError, ValidationError};
use stockroom_db::DbError;
use thiserror::Error;

/// Result type alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Not found, insufficient stock, or invalid input.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The order kept changing status underneath a transition.
    #[error("Order {0} is being modified concurrently, try again")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(DbError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Core(e) if e.is_not_found())
    }

    pub fn is_insufficient_stock(&self) -> bool {
        matches!(self, ServiceError::Core(CoreError::InsufficientStock { .. }))
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => match entity.as_str() {
                "Product" => CoreError::ProductNotFound(id).into(),
                "Order" => CoreError::OrderNotFound(id).into(),
                "Supplier" => CoreError::SupplierNotFound(id).into(),
                _ => ServiceError::Database(DbError::NotFound { entity, id }),
            },
            DbError::Domain(e) => ServiceError::Core(e),
            other => ServiceError::Database(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(CoreError::Validation(err))
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ServiceError {
    fn from(err: toml::de::Error) -> Self {
        ServiceError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ServiceError {
    fn from(err: toml::ser::Error) -> Self {
        ServiceError::ConfigSaveFailed(err.to_string())
    }
}
