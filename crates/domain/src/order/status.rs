//! Order status state machine.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Lifecycle status of a sales order.
///
/// ```text
/// Draft ──► Pending ──► Confirmed
///   │          │            │
///   └──────────┴────────────┴──► Cancelled
/// ```
///
/// `Confirmed` and `Cancelled` are terminal apart from the single
/// `Confirmed → Cancelled` escape hatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order is being assembled; items can be added and removed.
    #[default]
    Draft,

    /// An invoice has been opened for the order; awaiting payment.
    Pending,

    /// Payment received and the order confirmed (terminal).
    Confirmed,

    /// Order was cancelled (terminal).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if items can be added to or removed from the order.
    pub fn can_modify_items(&self) -> bool {
        matches!(self, OrderStatus::Draft)
    }

    /// Returns true if no further transitions are possible from this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Confirmed | OrderStatus::Cancelled)
    }

    /// Status name as serialized and shown in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "DRAFT",
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status name as produced by [`OrderStatus::as_str`].
    pub fn parse(name: &str) -> Option<OrderStatus> {
        match name {
            "DRAFT" => Some(OrderStatus::Draft),
            "PENDING" => Some(OrderStatus::Pending),
            "CONFIRMED" => Some(OrderStatus::Confirmed),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Validates a requested status change against the transition table.
    ///
    /// From `Confirmed` only `Cancelled` is accepted; from `Cancelled`
    /// nothing is. Every other transition is accepted here; payment gating
    /// for `Confirmed` is enforced by the dedicated confirm operation, not
    /// by this table.
    pub fn validate_transition(current: OrderStatus, requested: OrderStatus) -> Result<(), DomainError> {
        if current == OrderStatus::Confirmed && requested != OrderStatus::Cancelled {
            return Err(DomainError::illegal_transition(
                "Confirmed orders can only be transitioned to CANCELLED",
            ));
        }
        if current == OrderStatus::Cancelled {
            return Err(DomainError::illegal_transition(
                "Cancelled orders cannot be modified",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
