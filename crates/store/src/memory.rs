use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{InvoiceId, OrderId, Page, PageRequest, Version};
use domain::{Invoice, Order};
use tokio::sync::RwLock;

use crate::{InvoiceStore, OrderStore, Result, StoreError};

#[derive(Debug, Default)]
struct MemoryState {
    orders: Vec<Order>,
    invoices: Vec<Invoice>,
}

impl MemoryState {
    /// Version-checked order write, shared between the plain update and the
    /// atomic invoice-creation step.
    fn write_order(&mut self, mut order: Order) -> Result<Order> {
        let Some(index) = self.orders.iter().position(|o| o.id == order.id) else {
            return Err(StoreError::ConcurrencyConflict {
                order_id: order.id,
                expected: order.version,
                actual: Version::initial(),
            });
        };
        let actual = self.orders[index].version;
        if actual != order.version {
            return Err(StoreError::ConcurrencyConflict {
                order_id: order.id,
                expected: order.version,
                actual,
            });
        }
        order.version = order.version.next();
        order.updated_at = Utc::now();
        self.orders[index] = order.clone();
        Ok(order)
    }
}

/// In-memory store implementation for tests and local development.
///
/// A single lock guards both aggregates so the cross-aggregate
/// invoice-creation step is atomic, matching the transactional behavior of
/// the PostgreSQL implementation. Records keep insertion order, which is the
/// listing order.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Returns the number of stored invoices.
    pub async fn invoice_count(&self) -> usize {
        self.state.read().await.invoices.len()
    }

    /// Removes all stored orders and invoices.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.orders.clear();
        state.invoices.clear();
    }
}

fn paginate<T: Clone>(records: &[T], page: PageRequest) -> Page<T> {
    let total = records.len() as u64;
    let items = records
        .iter()
        .skip(page.offset())
        .take(page.limit())
        .cloned()
        .collect();
    Page::new(items, page, total)
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, mut order: Order) -> Result<Order> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.orders.iter().find(|o| o.id == order.id) {
            return Err(StoreError::ConcurrencyConflict {
                order_id: order.id,
                expected: Version::initial(),
                actual: existing.version,
            });
        }
        order.version = Version::first();
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let state = self.state.read().await;
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders(&self, page: PageRequest) -> Result<Page<Order>> {
        let state = self.state.read().await;
        Ok(paginate(&state.orders, page))
    }

    async fn update_order(&self, order: Order) -> Result<Order> {
        self.state.write().await.write_order(order)
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.orders.len();
        state.orders.retain(|o| o.id != id);
        Ok(state.orders.len() < before)
    }
}

#[async_trait]
impl InvoiceStore for InMemoryStore {
    async fn insert_invoice_with_order(
        &self,
        invoice: Invoice,
        order: Order,
    ) -> Result<(Invoice, Order)> {
        let mut state = self.state.write().await;
        if state
            .invoices
            .iter()
            .any(|existing| existing.order_id == invoice.order_id)
        {
            return Err(StoreError::DuplicateInvoice(invoice.order_id));
        }
        // Order write first: a stale version must leave the invoice unsaved.
        let order = state.write_order(order)?;
        state.invoices.push(invoice.clone());
        Ok((invoice, order))
    }

    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>> {
        let state = self.state.read().await;
        Ok(state.invoices.iter().find(|i| i.id == id).cloned())
    }

    async fn list_invoices(&self, page: PageRequest) -> Result<Page<Invoice>> {
        let state = self.state.read().await;
        Ok(paginate(&state.invoices, page))
    }

    async fn update_invoice(&self, mut invoice: Invoice) -> Result<Option<Invoice>> {
        let mut state = self.state.write().await;
        let Some(index) = state.invoices.iter().position(|i| i.id == invoice.id) else {
            return Ok(None);
        };
        invoice.updated_at = Utc::now();
        state.invoices[index] = invoice.clone();
        Ok(Some(invoice))
    }

    async fn delete_invoice(&self, id: InvoiceId) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.invoices.len();
        state.invoices.retain(|i| i.id != id);
        Ok(state.invoices.len() < before)
    }

    async fn invoice_exists_for_order(&self, order_id: OrderId) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.invoices.iter().any(|i| i.order_id == order_id))
    }

    async fn find_invoice_by_order(&self, order_id: OrderId) -> Result<Option<Invoice>> {
        let state = self.state.read().await;
        Ok(state
            .invoices
            .iter()
            .find(|i| i.order_id == order_id)
            .cloned())
    }
}
