//! Commands accepted by the order side of the lifecycle engine.
//!
//! Identifier and amount fields arrive as options so that missing mandatory
//! data surfaces as a domain validation error rather than being rejected at
//! the transport boundary.

use chrono::NaiveDate;
use common::{CustomerId, ProductId, ShopId};

use crate::error::DomainError;
use crate::money::Money;

use super::OrderStatus;

/// Caller-supplied description of one line item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemSpec {
    pub product_id: Option<ProductId>,
    pub quantity: Option<i32>,
    pub unit_price: Option<Money>,
}

impl ItemSpec {
    /// Creates a fully populated item spec.
    pub fn new(product_id: ProductId, quantity: i32, unit_price: Money) -> Self {
        Self {
            product_id: Some(product_id),
            quantity: Some(quantity),
            unit_price: Some(unit_price),
        }
    }

    fn incomplete() -> DomainError {
        DomainError::invalid_input(
            "Invalid item data: product ID, quantity, and unit price are required",
        )
    }

    /// Fails unless product id, quantity, and unit price are all present.
    pub fn require_complete(&self) -> Result<(), DomainError> {
        if self.product_id.is_none() || self.quantity.is_none() || self.unit_price.is_none() {
            return Err(Self::incomplete());
        }
        Ok(())
    }

    /// Validates presence and positivity, returning the checked fields.
    pub fn validated(&self) -> Result<(ProductId, u32, Money), DomainError> {
        let (Some(product_id), Some(quantity), Some(unit_price)) =
            (self.product_id, self.quantity, self.unit_price)
        else {
            return Err(Self::incomplete());
        };
        if quantity <= 0 {
            return Err(DomainError::invalid_input(
                "Quantity must be greater than zero",
            ));
        }
        if !unit_price.is_positive() {
            return Err(DomainError::invalid_input(
                "Unit price must be greater than zero",
            ));
        }
        Ok((product_id, quantity as u32, unit_price))
    }
}

/// Request to add a single item to an existing order.
pub type AddItem = ItemSpec;

/// Command to create a new sales order.
#[derive(Debug, Clone, Default)]
pub struct CreateOrder {
    pub customer_id: Option<CustomerId>,
    pub shop_id: Option<ShopId>,
    /// Defaults to today when absent.
    pub order_date: Option<NaiveDate>,
    pub items: Vec<ItemSpec>,
}

impl CreateOrder {
    /// Creates a command for the given customer and shop.
    pub fn new(customer_id: CustomerId, shop_id: ShopId) -> Self {
        Self {
            customer_id: Some(customer_id),
            shop_id: Some(shop_id),
            ..Self::default()
        }
    }

    /// Adds initial items to the command.
    pub fn with_items(mut self, items: impl IntoIterator<Item = ItemSpec>) -> Self {
        self.items = items.into_iter().collect();
        self
    }

    /// Sets an explicit order date.
    pub fn with_order_date(mut self, date: NaiveDate) -> Self {
        self.order_date = Some(date);
        self
    }
}

/// Command to update an existing sales order.
///
/// Every field is optional; `items: Some(...)` (even an empty list) replaces
/// the whole item set.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrder {
    pub customer_id: Option<CustomerId>,
    pub shop_id: Option<ShopId>,
    pub order_date: Option<NaiveDate>,
    pub status: Option<OrderStatus>,
    pub items: Option<Vec<ItemSpec>>,
}

impl UpdateOrder {
    /// A command that only requests a status change.
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// A command that only replaces the item set.
    pub fn items(items: impl IntoIterator<Item = ItemSpec>) -> Self {
        Self {
            items: Some(items.into_iter().collect()),
            ..Self::default()
        }
    }
}
