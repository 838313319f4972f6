//! Persistence layer for orders and invoices.
//!
//! Two implementations of the same store traits:
//! - [`InMemoryStore`] for tests and local development
//! - [`PostgresStore`] backed by sqlx, one transaction per operation
//!
//! The cross-aggregate invoice-creation step
//! ([`InvoiceStore::insert_invoice_with_order`]) persists the invoice row and
//! the order's new status atomically, or neither.

pub mod error;
pub mod invoice;
pub mod memory;
pub mod order;
pub mod postgres;

pub use error::{Result, StoreError};
pub use invoice::InvoiceStore;
pub use memory::InMemoryStore;
pub use order::OrderStore;
pub use postgres::PostgresStore;

/// Convenience bound for a backend that persists both aggregates.
pub trait SalesStore: OrderStore + InvoiceStore {}

impl<T: OrderStore + InvoiceStore> SalesStore for T {}
