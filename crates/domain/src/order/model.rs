//! Sales order aggregate and its line-item ledger.

use chrono::{DateTime, NaiveDate, Utc};
use common::{CustomerId, OrderId, OrderItemId, ProductId, ShopId, Version};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::Money;

use super::OrderStatus;

/// One product line on an order.
///
/// The total price is derived from quantity and unit price at construction
/// and on every update; callers never supply it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
    pub total_price: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderItem {
    /// Creates a line item, deriving the total price.
    pub fn new(product_id: ProductId, quantity: u32, unit_price: Money) -> Self {
        let now = Utc::now();
        Self {
            id: OrderItemId::new(),
            product_id,
            quantity,
            unit_price,
            total_price: unit_price.multiply(quantity),
            created_at: now,
            updated_at: now,
        }
    }
}

/// The kind of item mutation being attempted, for status gating messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemMutation {
    Add,
    Delete,
}

/// Sales order aggregate root.
///
/// Owns its line items; deleting the order deletes the items. The total
/// amount always equals the sum of the item totals, and item mutation is
/// only accepted while the order is in `Draft`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub shop_id: ShopId,
    pub order_date: NaiveDate,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub items: Vec<OrderItem>,
    pub version: Version,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new draft order with no items and a zero total.
    pub fn new(customer_id: CustomerId, shop_id: ShopId, order_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            customer_id,
            shop_id,
            order_date,
            status: OrderStatus::Draft,
            total_amount: Money::zero(),
            items: Vec::new(),
            version: Version::initial(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Re-derives the total amount from the item totals.
    pub fn recalculate_total(&mut self) {
        self.total_amount = self.items.iter().map(|item| item.total_price).sum();
    }

    /// Returns the item with the given id, if present.
    pub fn item(&self, item_id: OrderItemId) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Returns the number of line items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the order has at least one line item.
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    /// Fails with a status-specific message unless items may be added.
    pub fn ensure_can_add_items(&self) -> Result<(), DomainError> {
        self.ensure_item_mutation(ItemMutation::Add)
    }

    /// Fails with a status-specific message unless items may be deleted.
    pub fn ensure_can_delete_items(&self) -> Result<(), DomainError> {
        self.ensure_item_mutation(ItemMutation::Delete)
    }

    /// Appends a validated line item and recomputes the total.
    ///
    /// Rejected with a status-specific message unless the order is `Draft`.
    pub fn add_item(&mut self, item: OrderItem) -> Result<(), DomainError> {
        self.ensure_item_mutation(ItemMutation::Add)?;
        self.items.push(item);
        self.recalculate_total();
        Ok(())
    }

    /// Removes a line item and recomputes the total.
    ///
    /// Rejected with a status-specific message unless the order is `Draft`;
    /// an unknown item id is a not-found error.
    pub fn remove_item(&mut self, item_id: OrderItemId) -> Result<OrderItem, DomainError> {
        self.ensure_item_mutation(ItemMutation::Delete)?;
        let index = self
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| {
                DomainError::not_found(format!(
                    "Sales order item with ID {item_id} not found in order {}",
                    self.id
                ))
            })?;
        let removed = self.items.remove(index);
        self.recalculate_total();
        Ok(removed)
    }

    /// Replaces the entire item set and recomputes the total.
    ///
    /// Used by the full-update path, which replaces items without status
    /// gating; callers must have validated every item beforehand so the
    /// swap is all-or-nothing.
    pub fn replace_items(&mut self, items: Vec<OrderItem>) {
        self.items = items;
        self.recalculate_total();
    }

    fn ensure_item_mutation(&self, mutation: ItemMutation) -> Result<(), DomainError> {
        let blocked = match self.status {
            OrderStatus::Draft => return Ok(()),
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Cancelled => "cancelled",
        };
        Err(DomainError::illegal_transition(match mutation {
            ItemMutation::Add => format!("Cannot add items to a {blocked} order"),
            ItemMutation::Delete => format!("Cannot delete items from a {blocked} order"),
        }))
    }
}
