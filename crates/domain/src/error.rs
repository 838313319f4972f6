//! Domain error taxonomy.
//!
//! Every operation of the lifecycle engine fails with exactly one of these
//! kinds, carrying a human-readable message. The transport shell maps each
//! kind to a protocol status; nothing inside the core dispatches on message
//! text.

use thiserror::Error;

/// Errors surfaced by domain operations.
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// A referenced order, invoice, item, customer, shop, or product does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Missing mandatory field, non-positive quantity or price, absent identifier.
    #[error("{0}")]
    InvalidInput(String),

    /// A status change or item mutation not permitted from the current state.
    #[error("{0}")]
    IllegalStateTransition(String),

    /// The operation contradicts existing state: duplicate invoice, unpaid
    /// confirmation, deletion of an invoiced or non-draft order, stale write.
    #[error("{0}")]
    ConflictingState(String),

    /// The caller's resolved authorization does not cover the operation.
    #[error("{0}")]
    Forbidden(String),

    /// Backing-store failure unrelated to business rules.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn illegal_transition(message: impl Into<String>) -> Self {
        Self::IllegalStateTransition(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::ConflictingState(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}
