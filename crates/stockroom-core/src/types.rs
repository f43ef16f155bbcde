//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌─────────────────┐  supplier_id   ┌─────────────────┐                │
//! │  │    Product      │───────────────►│    Supplier     │                │
//! │  │  ─────────────  │                │  ─────────────  │                │
//! │  │  quantity ≥ 0   │◄───────────────│  products_      │                │
//! │  │  threshold      │  (add-only set)│  supplied       │                │
//! │  │  last_notif..   │                │  email          │                │
//! │  └────────▲────────┘                └─────────────────┘                │
//! │           │ product_id                                                  │
//! │  ┌────────┴────────┐                                                    │
//! │  │     Order       │   status: issued ⇄ returned                       │
//! │  │  quantity       │   total_price = qty × price_per_item              │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! References between entities are plain ids. A deleted product leaves its
//! orders behind; a deleted supplier leaves its products behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A stocked item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    pub description: Option<String>,

    pub category: Option<String>,

    /// Units on hand. Never negative.
    pub quantity: i64,

    /// Low-stock boundary, inclusive: `quantity <= threshold` is low.
    pub threshold: i64,

    /// Accumulated purchase value of everything stocked, in cents.
    pub total_price_cents: i64,

    /// Supplier that is alerted when this product runs low.
    pub supplier_id: String,

    /// When the supplier was last alerted, if ever.
    pub last_notification_sent: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }

    /// True when stock is at or below the threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        crate::stock::is_low_stock(self.quantity, self.threshold)
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Initial stock.
    pub quantity: i64,
    /// Defaults to [`crate::DEFAULT_LOW_STOCK_THRESHOLD`].
    pub threshold: Option<i64>,
    /// Unit purchase price of the initial stock.
    pub price_per_item_cents: i64,
    pub supplier_id: String,
}

/// Input for adding stock to an existing product.
///
/// `quantity` may be negative to correct a miscount; the Stock Ledger still
/// refuses to go below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restock {
    pub quantity: i64,
    pub price_per_item_cents: i64,
}

// =============================================================================
// Supplier
// =============================================================================

/// Someone who supplies products and receives low-stock alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,

    /// Trimmed on input.
    pub name: String,

    pub contact_number: String,

    /// Lower-cased on input. Alerts are skipped while this is empty.
    pub email: Option<String>,

    pub address: Option<String>,

    /// Ids of products ever created against this supplier.
    ///
    /// Add-only: deleting a product does not remove it from this set.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub products_supplied: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub contact_number: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Partial update of a supplier. `None` leaves the field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl SupplierPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.contact_number.is_none()
            && self.email.is_none()
            && self.address.is_none()
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Whether an order's units are out with the recipient or back on the shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Units have left stock.
    #[default]
    Issued,
    /// Units have come back into stock.
    Returned,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 2] = [OrderStatus::Issued, OrderStatus::Returned];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Issued => "issued",
            OrderStatus::Returned => "returned",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "issued" => Ok(OrderStatus::Issued),
            "returned" => Ok(OrderStatus::Returned),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A record of units issued to someone, or returned by them.
///
/// An order with `quantity == 0` is a log-only record: it never moved stock
/// and its transitions never will.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    pub issued_to: String,
    pub purpose: String,
    /// Opaque reference to whoever recorded the order.
    pub issued_by: Option<String>,
    /// `quantity × price_per_item`, fixed at creation.
    pub total_price_cents: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

/// Input for creating an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub product_id: String,
    /// `None` or `Some(0)` records the order without touching stock.
    pub quantity: Option<i64>,
    pub issued_to: String,
    pub purpose: String,
    pub issued_by: Option<String>,
    pub price_per_item_cents: i64,
    /// Defaults to [`OrderStatus::Issued`].
    pub status: Option<OrderStatus>,
}

/// An order with its product's name, for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderView {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub order: Order,
    /// `None` once the product has been deleted.
    pub product_name: Option<String>,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Headline counts for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub product_count: i64,
    pub order_count: i64,
    pub supplier_count: i64,
    /// Sum of `total_price_cents` over orders currently issued.
    pub total_revenue_cents: i64,
}

impl DashboardStats {
    #[inline]
    pub fn total_revenue(&self) -> Money {
        Money::from_cents(self.total_revenue_cents)
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        PageRequest { page, limit }
    }

    /// Rows to skip: `(page - 1) * limit`.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            limit: crate::DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub limit: u32,
    pub total: i64,
    /// `page * limit < total`.
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        let seen = i64::from(request.page) * i64::from(request.limit);
        Page {
            items,
            current_page: request.page,
            limit: request.limit,
            total,
            has_more: seen < total,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
