//! Commands accepted by the invoice side of the lifecycle engine.

use chrono::NaiveDate;
use common::OrderId;

use super::PaymentStatus;

/// Command to open an invoice for a sales order.
#[derive(Debug, Clone, Default)]
pub struct CreateInvoice {
    pub order_id: Option<OrderId>,
    pub invoice_date: Option<NaiveDate>,
}

impl CreateInvoice {
    /// Creates a fully populated command.
    pub fn new(order_id: OrderId, invoice_date: NaiveDate) -> Self {
        Self {
            order_id: Some(order_id),
            invoice_date: Some(invoice_date),
        }
    }
}

/// Command to update an invoice.
///
/// The payment status field is how the external billing process records the
/// payment fact this service reads back when confirming an order.
#[derive(Debug, Clone, Default)]
pub struct UpdateInvoice {
    pub order_id: Option<OrderId>,
    pub invoice_date: Option<NaiveDate>,
    pub payment_status: Option<PaymentStatus>,
}

impl UpdateInvoice {
    /// A command that only records a new payment status.
    pub fn payment_status(status: PaymentStatus) -> Self {
        Self {
            payment_status: Some(status),
            ..Self::default()
        }
    }

    /// A command that re-points the invoice at a different order.
    pub fn order(order_id: OrderId) -> Self {
        Self {
            order_id: Some(order_id),
            ..Self::default()
        }
    }
}
