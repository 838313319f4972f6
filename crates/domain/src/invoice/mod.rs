//! Invoice record and related types.

mod commands;
mod model;

pub use commands::{CreateInvoice, UpdateInvoice};
pub use model::{Invoice, PaymentStatus};
