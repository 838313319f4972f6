//! Order lifecycle engine.
//!
//! This crate wires the pure domain model to its collaborators:
//! - [`OrderService`] validates and applies every order mutation, enforcing
//!   the status state machine and the total-amount invariant
//! - [`InvoiceService`] coordinates invoice issuance with the order it bills,
//!   persisting both sides atomically
//! - [`notify`] carries status-change events to external observers on a
//!   best-effort basis
//!
//! Every operation takes a resolved [`Authorization`](domain::Authorization)
//! value and runs as one unit of work against the store; peer directory
//! lookups happen before any local mutation, and notification happens after
//! the write commits.

mod convert;
pub mod invoices;
pub mod notify;
pub mod orders;

pub use invoices::InvoiceService;
pub use notify::{
    ChannelSink, DeliveryError, LogTransport, NotificationSink, NotificationTransport,
    RecordingSink, StatusChanged,
};
pub use orders::OrderService;
