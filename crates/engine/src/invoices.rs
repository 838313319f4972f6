//! Invoice coordination.
//!
//! Opening an invoice locks its order into the billing-pending status; the
//! two writes are one atomic store operation, so the invoice row and the
//! order's new status land together or not at all.

use common::{InvoiceId, Page, PageRequest};
use domain::{
    Authorization, CreateInvoice, DomainError, Invoice, OrderStatus, Permission, UpdateInvoice,
};
use store::SalesStore;

use crate::convert::store_error;
use crate::notify::NotificationSink;

/// Service owning invoice issuance and maintenance.
pub struct InvoiceService<S, N> {
    store: S,
    notifier: N,
}

impl<S, N> InvoiceService<S, N>
where
    S: SalesStore,
    N: NotificationSink,
{
    /// Creates the service over its collaborators.
    pub fn new(store: S, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// Opens an unpaid invoice for an order and drives the order to
    /// `Pending`, atomically.
    #[tracing::instrument(skip(self, authz, cmd))]
    pub async fn create_invoice(
        &self,
        authz: &Authorization,
        cmd: CreateInvoice,
    ) -> Result<Invoice, DomainError> {
        authz.require(Permission::CreateInvoice)?;

        let order_id = cmd
            .order_id
            .ok_or_else(|| DomainError::invalid_input("Sales order ID is mandatory"))?;
        let invoice_date = cmd
            .invoice_date
            .ok_or_else(|| DomainError::invalid_input("Invoice date is mandatory"))?;

        let mut order = self
            .store
            .get_order(order_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| {
                DomainError::not_found(format!("Sales order with ID {order_id} not found"))
            })?;

        if order.status == OrderStatus::Cancelled {
            return Err(DomainError::conflict(format!(
                "Cannot create invoice for cancelled sales order with ID {order_id}"
            )));
        }
        let already_invoiced = self
            .store
            .invoice_exists_for_order(order_id)
            .await
            .map_err(store_error)?;
        if already_invoiced {
            return Err(DomainError::conflict(format!(
                "Invoice for sales order ID {order_id} already exists"
            )));
        }

        // The billing-pending lock goes through the same transition table as
        // any other status change.
        OrderStatus::validate_transition(order.status, OrderStatus::Pending)?;
        order.status = OrderStatus::Pending;

        let invoice = Invoice::new(order_id, invoice_date);
        let (invoice, order) = self
            .store
            .insert_invoice_with_order(invoice, order)
            .await
            .map_err(store_error)?;

        self.notifier.publish(order.id, order.status);
        metrics::counter!("invoices_created_total").increment(1);
        tracing::info!(invoice_id = %invoice.id, order_id = %order.id, "invoice created");
        Ok(invoice)
    }

    /// Loads an invoice by id.
    #[tracing::instrument(skip(self, authz))]
    pub async fn get_invoice(
        &self,
        authz: &Authorization,
        id: InvoiceId,
    ) -> Result<Invoice, DomainError> {
        authz.require(Permission::ReadInvoice)?;
        self.load_invoice(id).await
    }

    /// Lists invoices one page at a time.
    #[tracing::instrument(skip(self, authz))]
    pub async fn list_invoices(
        &self,
        authz: &Authorization,
        page: PageRequest,
    ) -> Result<Page<Invoice>, DomainError> {
        authz.require(Permission::ReadInvoice)?;
        self.store.list_invoices(page).await.map_err(store_error)
    }

    /// Applies field changes to an invoice.
    ///
    /// A new order reference is re-validated (the order must exist and not
    /// be cancelled); the payment status is the external billing fact and is
    /// stored as given.
    #[tracing::instrument(skip(self, authz, cmd))]
    pub async fn update_invoice(
        &self,
        authz: &Authorization,
        id: InvoiceId,
        cmd: UpdateInvoice,
    ) -> Result<Invoice, DomainError> {
        authz.require(Permission::UpdateInvoice)?;

        let mut invoice = self.load_invoice(id).await?;

        if let Some(order_id) = cmd.order_id {
            let order = self
                .store
                .get_order(order_id)
                .await
                .map_err(store_error)?
                .ok_or_else(|| {
                    DomainError::not_found(format!("Sales order with ID {order_id} not found"))
                })?;
            if order.status == OrderStatus::Cancelled {
                return Err(DomainError::conflict(format!(
                    "Cannot update invoice to use cancelled sales order with ID {order_id}"
                )));
            }
            invoice.order_id = order_id;
        }
        if let Some(invoice_date) = cmd.invoice_date {
            invoice.invoice_date = invoice_date;
        }
        if let Some(payment_status) = cmd.payment_status {
            invoice.payment_status = payment_status;
        }

        self.store
            .update_invoice(invoice)
            .await
            .map_err(store_error)?
            .ok_or_else(|| DomainError::not_found(format!("Invoice with ID {id} not found")))
    }

    /// Deletes an invoice. Unconditional once found; no order-side invariant
    /// is re-checked.
    #[tracing::instrument(skip(self, authz))]
    pub async fn delete_invoice(
        &self,
        authz: &Authorization,
        id: InvoiceId,
    ) -> Result<(), DomainError> {
        authz.require(Permission::DeleteInvoice)?;

        let deleted = self.store.delete_invoice(id).await.map_err(store_error)?;
        if !deleted {
            return Err(DomainError::not_found(format!(
                "Invoice with ID {id} not found"
            )));
        }
        Ok(())
    }

    async fn load_invoice(&self, id: InvoiceId) -> Result<Invoice, DomainError> {
        self.store
            .get_invoice(id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| DomainError::not_found(format!("Invoice with ID {id} not found")))
    }
}
