use async_trait::async_trait;
use common::{InvoiceId, OrderId, Page, PageRequest};
use domain::{Invoice, Order};

use crate::Result;

/// Persistence contract for invoices.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Atomically inserts an invoice and writes back the order it was issued
    /// against: either both land or neither does.
    ///
    /// This is the storage half of the cross-aggregate rule that opening an
    /// invoice drives the order to its billing-pending status. Fails with
    /// [`StoreError::DuplicateInvoice`](crate::StoreError) when the order is
    /// already invoiced, and with a concurrency conflict when the order
    /// version is stale.
    async fn insert_invoice_with_order(
        &self,
        invoice: Invoice,
        order: Order,
    ) -> Result<(Invoice, Order)>;

    /// Loads an invoice by id.
    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>>;

    /// Lists invoices in creation order, one page at a time.
    async fn list_invoices(&self, page: PageRequest) -> Result<Page<Invoice>>;

    /// Writes back a modified invoice, refreshing `updated_at`.
    ///
    /// Returns `None` when the invoice no longer exists.
    async fn update_invoice(&self, invoice: Invoice) -> Result<Option<Invoice>>;

    /// Deletes an invoice. Returns false when it did not exist.
    async fn delete_invoice(&self, id: InvoiceId) -> Result<bool>;

    /// Returns true if any invoice references the order.
    async fn invoice_exists_for_order(&self, order_id: OrderId) -> Result<bool>;

    /// Finds the invoice issued against the order, if any.
    async fn find_invoice_by_order(&self, order_id: OrderId) -> Result<Option<Invoice>>;
}
