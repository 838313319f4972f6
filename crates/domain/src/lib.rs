//! Domain model for the sales-management service.
//!
//! This crate provides the pure business objects and rules:
//! - Order aggregate with its line-item ledger and total-amount invariant
//! - Order status state machine with transition validation
//! - Invoice record with payment status
//! - Command types accepted by the lifecycle engine
//! - The uniform domain error taxonomy
//! - Resolved authorization values passed into every operation

pub mod authz;
pub mod error;
pub mod invoice;
pub mod money;
pub mod order;

pub use authz::{Authorization, Permission};
pub use error::DomainError;
pub use invoice::{CreateInvoice, Invoice, PaymentStatus, UpdateInvoice};
pub use money::Money;
pub use order::{AddItem, CreateOrder, ItemSpec, Order, OrderItem, OrderStatus, UpdateOrder};
