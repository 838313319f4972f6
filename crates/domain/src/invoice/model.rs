//! Invoice record issued against a sales order.

use chrono::{DateTime, NaiveDate, Utc};
use common::{InvoiceId, OrderId};
use serde::{Deserialize, Serialize};

/// Payment state of an invoice, mutated by the external billing process and
/// only ever read by the lifecycle engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl PaymentStatus {
    /// Status name as serialized and shown in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "UNPAID",
            PaymentStatus::PartiallyPaid => "PARTIALLY_PAID",
            PaymentStatus::Paid => "PAID",
        }
    }

    /// Parses a status name as produced by [`PaymentStatus::as_str`].
    pub fn parse(name: &str) -> Option<PaymentStatus> {
        match name {
            "UNPAID" => Some(PaymentStatus::Unpaid),
            "PARTIALLY_PAID" => Some(PaymentStatus::PartiallyPaid),
            "PAID" => Some(PaymentStatus::Paid),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Billing record tied to exactly one sales order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub order_id: OrderId,
    pub invoice_date: NaiveDate,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates a new unpaid invoice for an order.
    pub fn new(order_id: OrderId, invoice_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: InvoiceId::new(),
            order_id,
            invoice_date,
            payment_status: PaymentStatus::Unpaid,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the invoice is fully paid.
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }
}
