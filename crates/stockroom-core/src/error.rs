//! # Domain Errors
//!
//! ```text
//!   ValidationError ──► CoreError ──► DbError ──► ServiceError
//!   (bad input)         (NotFound,    (storage)   (what callers see)
//!                        low stock)
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations surfaced to callers.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No product with this id.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// No order with this id.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// No supplier with this id.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(String),

    /// Applying the requested change would drive stock below zero.
    ///
    /// ## User Workflow
    /// ```text
    /// Issue 5 units
    ///      │
    ///      ▼
    /// Stock Ledger: quantity=4, 4 + (-5) < 0
    ///      │
    ///      ▼
    /// InsufficientStock { available: 4, requested: 5 }
    ///      │
    ///      ▼
    /// Caller shows: "Only 4 pieces available"
    /// ```
    #[error("Low stock for product {product_id}. Only {available} pieces available, {requested} requested")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// True for the three NotFound variants.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::ProductNotFound(_)
                | CoreError::OrderNotFound(_)
                | CoreError::SupplierNotFound(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Rejected input, caught before any database work starts.
///
/// `field` is the wire name of the offending field (`issued_to`, `limit`, ...).
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Malformed email, SKU or price text.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// An order status outside `issued` / `returned`.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
