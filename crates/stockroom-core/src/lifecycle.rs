//! # Order Lifecycle Rules
//!
//! Which stock delta a status change implies.
//!
//! ```text
//!                 create (issued): −qty
//!                        │
//!                        ▼
//!              ┌──────────────────┐   +qty    ┌──────────────────┐
//!              │      issued      │ ────────► │     returned     │
//!              │                  │ ◄──────── │                  │
//!              └──────────────────┘   −qty    └──────────────────┘
//!                                                      ▲
//!                                                      │
//!                                   create (returned): 0
//!
//!   same state → same state: Unchanged (no write, success)
//! ```
//!
//! The functions here only plan. The database layer carries the plan out
//! atomically.

use serde::{Deserialize, Serialize};

use crate::types::OrderStatus;

/// Outcome of planning a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusChange {
    /// Target equals current status. Nothing is written.
    Unchanged,
    /// Status moves and stock moves by `delta`.
    Move {
        from: OrderStatus,
        to: OrderStatus,
        delta: i64,
    },
}

impl StatusChange {
    /// Stock delta implied by the change (0 when unchanged).
    pub fn delta(&self) -> i64 {
        match self {
            StatusChange::Unchanged => 0,
            StatusChange::Move { delta, .. } => *delta,
        }
    }
}

/// Plans moving an order of `quantity` units from `current` to `target`.
pub fn plan_transition(current: OrderStatus, target: OrderStatus, quantity: i64) -> StatusChange {
    let delta = match (current, target) {
        (OrderStatus::Issued, OrderStatus::Issued)
        | (OrderStatus::Returned, OrderStatus::Returned) => return StatusChange::Unchanged,
        (OrderStatus::Issued, OrderStatus::Returned) => quantity,
        (OrderStatus::Returned, OrderStatus::Issued) => -quantity,
    };

    StatusChange::Move {
        from: current,
        to: target,
        delta,
    }
}

/// Stock delta for creating an order of `quantity` units in `status`.
///
/// Only `issued` takes units out; an order recorded as already `returned`
/// never held any.
pub fn creation_delta(status: OrderStatus, quantity: i64) -> i64 {
    match status {
        OrderStatus::Issued => -quantity,
        OrderStatus::Returned => 0,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_state_is_unchanged() {
        for status in OrderStatus::ALL {
            assert_eq!(plan_transition(status, status, 7), StatusChange::Unchanged);
        }
    }

    #[test]
    fn test_return_adds_issue_removes() {
        let back = plan_transition(OrderStatus::Issued, OrderStatus::Returned, 3);
        assert_eq!(
            back,
            StatusChange::Move {
                from: OrderStatus::Issued,
                to: OrderStatus::Returned,
                delta: 3
            }
        );

        let out = plan_transition(OrderStatus::Returned, OrderStatus::Issued, 3);
        assert_eq!(out.delta(), -3);
    }

    #[test]
    fn test_round_trip_nets_to_zero() {
        let qty = 9;
        let mut net = creation_delta(OrderStatus::Issued, qty);
        let mut status = OrderStatus::Issued;
        for target in [
            OrderStatus::Returned,
            OrderStatus::Returned,
            OrderStatus::Issued,
            OrderStatus::Returned,
        ] {
            net += plan_transition(status, target, qty).delta();
            status = target;
        }
        // Final state returned: everything is back on the shelf
        assert_eq!(net, 0);
    }

    #[test]
    fn test_creation_delta() {
        assert_eq!(creation_delta(OrderStatus::Issued, 6), -6);
        assert_eq!(creation_delta(OrderStatus::Returned, 6), 0);
        assert_eq!(creation_delta(OrderStatus::Issued, 0), 0);
    }

    #[test]
    fn test_zero_quantity_move_has_zero_delta() {
        let change = plan_transition(OrderStatus::Issued, OrderStatus::Returned, 0);
        assert!(matches!(change, StatusChange::Move { delta: 0, .. }));
    }
}
