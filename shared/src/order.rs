//! Kitchen order types and status state machine
//!
//! One kitchen order is derived from one cart line of a confirmed sale.
//! The cook advances it through a strictly forward chain:
//!
//! ```text
//! Received -> Preparing -> Closed
//! ```
//!
//! `Closed` is terminal. Any other transition is rejected with
//! [`TransitionError`] instead of being applied silently.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kitchen order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order received by the kitchen
    #[default]
    Received,
    /// Being prepared
    Preparing,
    /// Handed out, terminal
    Closed,
}

impl OrderStatus {
    /// The only status this one may advance to, if any
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            Self::Received => Some(Self::Preparing),
            Self::Preparing => Some(Self::Closed),
            Self::Closed => None,
        }
    }

    /// Whether the order still sits in the active queue
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Received | Self::Preparing)
    }

    /// Validate a requested transition
    ///
    /// Only the single forward step is legal; skipping ahead, rewinding and
    /// repeating the current status are all rejected.
    pub fn validate_transition(&self, to: OrderStatus) -> Result<(), TransitionError> {
        if self.next() == Some(to) {
            Ok(())
        } else {
            Err(TransitionError { from: *self, to })
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Received => write!(f, "RECEIVED"),
            Self::Preparing => write!(f, "PREPARING"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Rejected kitchen order status transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Illegal order transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// Kitchen order - one unit of work for the cook
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KitchenOrder {
    pub id: String,
    /// Product name snapshot at sale time
    pub product: String,
    pub qty: i32,
    pub status: OrderStatus,
    /// Creation time; refreshed to the closing time on the Closed transition
    /// (Unix millis)
    pub date: i64,
    /// Line amount: override or qty * unit price
    pub amount: f64,
}

/// Create kitchen order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    /// Product name snapshot
    pub product: String,
    pub qty: i32,
    /// Unit price used when no amount override is given
    pub unit_price: f64,
    /// Line amount override
    pub amount: Option<f64>,
}

/// Advance kitchen order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAdvance {
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_chain_is_legal() {
        assert!(
            OrderStatus::Received
                .validate_transition(OrderStatus::Preparing)
                .is_ok()
        );
        assert!(
            OrderStatus::Preparing
                .validate_transition(OrderStatus::Closed)
                .is_ok()
        );
    }

    #[test]
    fn skip_rewind_and_repeat_are_rejected() {
        let skip = OrderStatus::Received.validate_transition(OrderStatus::Closed);
        assert_eq!(
            skip,
            Err(TransitionError {
                from: OrderStatus::Received,
                to: OrderStatus::Closed
            })
        );

        assert!(
            OrderStatus::Closed
                .validate_transition(OrderStatus::Preparing)
                .is_err()
        );
        assert!(
            OrderStatus::Preparing
                .validate_transition(OrderStatus::Preparing)
                .is_err()
        );
    }

    #[test]
    fn closed_is_terminal() {
        assert_eq!(OrderStatus::Closed.next(), None);
        assert!(!OrderStatus::Closed.is_active());
        assert!(OrderStatus::Received.is_active());
    }

    #[test]
    fn status_serializes_screaming_snake() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, "\"PREPARING\"");
    }
}
