//! # Order Lifecycle
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     transition_order(id, target)                        │
//! │                                                                         │
//! │   ┌──► read order ── missing ──► OrderNotFound                         │
//! │   │        │                                                            │
//! │   │        ▼                                                            │
//! │   │   plan_transition(current, target, qty)                            │
//! │   │        │                                                            │
//! │   │        ├── Unchanged ──► Ok(Unchanged)        (no write)           │
//! │   │        ▼                                                            │
//! │   │   BEGIN; UPDATE orders ... WHERE status = current;                 │
//! │   │          ledger apply Δ; COMMIT                                    │
//! │   │        │                                                            │
//! │   │        ├── refused ──► InsufficientStock     (nothing written)     │
//! │   └─ Stale ┤                                                            │
//! │  (≤3 tries)▼                                                            │
//! │        Applied ──► low-stock check ──► Ok(Applied)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};

use stockroom_core::lifecycle::creation_delta;
use stockroom_core::validation::{
    validate_optional, validate_order_quantity, validate_price_cents, validate_required,
};
use stockroom_core::{
    plan_transition, CoreError, NewOrder, Order, OrderStatus, OrderView, Page, PageRequest,
    StatusChange,
};
use stockroom_db::{generate_order_id, TransitionWrite};

use crate::error::{ServiceError, ServiceResult};
use crate::service::{line_total, Stockroom};

/// How many times a transition re-plans after losing a race.
const MAX_TRANSITION_ATTEMPTS: usize = 3;

/// Result of [`Stockroom::transition_order`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "order", rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// Status changed and stock moved.
    Applied(Order),
    /// The order was already in the target status.
    Unchanged(Order),
}

impl TransitionOutcome {
    pub fn order(&self) -> &Order {
        match self {
            TransitionOutcome::Applied(order) | TransitionOutcome::Unchanged(order) => order,
        }
    }

    pub fn into_order(self) -> Order {
        match self {
            TransitionOutcome::Applied(order) | TransitionOutcome::Unchanged(order) => order,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied(_))
    }
}

impl Stockroom {
    /// Records an order and takes its units off the shelf.
    ///
    /// An order created as `issued` consumes `quantity`; one created as
    /// `returned`, or with no quantity, is a record only. If the shelf cannot
    /// cover it, nothing is written and `InsufficientStock` reports what is
    /// available.
    pub async fn create_order(&self, input: NewOrder) -> ServiceResult<Order> {
        let product_id = validate_required("product_id", &input.product_id, 64)?;
        let quantity = validate_order_quantity(input.quantity)?;
        let price = validate_price_cents(input.price_per_item_cents)?;
        let total = line_total(price, quantity)?;
        let issued_to = validate_required("issued_to", &input.issued_to, 200)?;
        let purpose = validate_required("purpose", &input.purpose, 500)?;
        let issued_by = validate_optional("issued_by", input.issued_by.as_deref(), 200)?;
        let status = input.status.unwrap_or_default();
        let delta = creation_delta(status, quantity);

        // With stock to move the ledger reports a missing product itself
        if delta == 0 && self.db.products().get_by_id(&product_id).await?.is_none() {
            return Err(CoreError::ProductNotFound(product_id).into());
        }

        let now = self.now();
        let order = Order {
            id: generate_order_id(),
            product_id,
            quantity,
            issued_to,
            purpose,
            issued_by,
            total_price_cents: total.cents(),
            status,
            created_at: now,
            updated_at: now,
        };

        let level = self.db.orders().create(&order, delta).await?;

        info!(
            id = %order.id,
            product_id = %order.product_id,
            quantity = order.quantity,
            %status,
            "Order created"
        );

        if let Some(level) = level {
            self.alerts.check(&level).await;
        }

        Ok(order)
    }

    /// Moves an order to `target` and applies the inverse stock delta.
    ///
    /// Asking for the status the order already has succeeds with
    /// [`TransitionOutcome::Unchanged`] and writes nothing.
    pub async fn transition_order(
        &self,
        id: &str,
        target: OrderStatus,
    ) -> ServiceResult<TransitionOutcome> {
        for attempt in 1..=MAX_TRANSITION_ATTEMPTS {
            let order = self
                .db
                .orders()
                .get_by_id(id)
                .await?
                .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))?;

            let (from, to, delta) = match plan_transition(order.status, target, order.quantity) {
                StatusChange::Unchanged => {
                    debug!(id = %id, status = %target, "Order already in target status");
                    return Ok(TransitionOutcome::Unchanged(order));
                }
                StatusChange::Move { from, to, delta } => (from, to, delta),
            };

            match self.db.orders().transition(id, from, to, delta).await? {
                TransitionWrite::Applied { order, stock } => {
                    info!(id = %id, %from, %to, delta, "Order transitioned");
                    if let Some(level) = stock {
                        self.alerts.check(&level).await;
                    }
                    return Ok(TransitionOutcome::Applied(order));
                }
                TransitionWrite::Stale => {
                    debug!(id = %id, attempt, "Order changed during transition, re-planning");
                }
            }
        }

        warn!(id = %id, "Order transition kept losing to concurrent updates");
        Err(ServiceError::Conflict(id.to_string()))
    }

    /// Deletes the order record.
    ///
    /// Stock is NOT restored: units an issued order took stay taken.
    pub async fn delete_order(&self, id: &str) -> ServiceResult<()> {
        self.db.orders().delete(id).await?;
        info!(id = %id, "Order deleted");
        Ok(())
    }

    pub async fn get_order(&self, id: &str) -> ServiceResult<Order> {
        self.db
            .orders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(id.to_string()).into())
    }

    /// Orders newest first, with their product's name.
    pub async fn list_orders(&self, request: PageRequest) -> ServiceResult<Page<OrderView>> {
        let request = self.check_page(request)?;
        Ok(self.db.orders().list(request).await?)
    }
}
