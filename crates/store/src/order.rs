use async_trait::async_trait;
use common::{OrderId, Page, PageRequest};
use domain::Order;

use crate::Result;

/// Persistence contract for the order aggregate, items included.
///
/// Writes use the order's [`Version`](common::Version) as an optimistic
/// concurrency token: `update_order` only succeeds when the caller's loaded
/// version still matches the persisted one, and bumps it on success.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a new order and returns the persisted copy at
    /// [`Version::first`](common::Version::first).
    async fn insert_order(&self, order: Order) -> Result<Order>;

    /// Loads an order with its items.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Lists orders in creation order, one page at a time.
    async fn list_orders(&self, page: PageRequest) -> Result<Page<Order>>;

    /// Writes back a modified order.
    ///
    /// Fails with [`StoreError::ConcurrencyConflict`](crate::StoreError) when
    /// the persisted version differs from `order.version`; the returned copy
    /// carries the bumped version and refreshed `updated_at`.
    async fn update_order(&self, order: Order) -> Result<Order>;

    /// Deletes an order and, cascading, its items. Returns false when the
    /// order did not exist.
    async fn delete_order(&self, id: OrderId) -> Result<bool>;
}
