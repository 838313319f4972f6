//! Order lifecycle operations.

use chrono::Utc;
use common::{CustomerId, OrderId, OrderItemId, Page, PageRequest, ProductId, ShopId};
use directory::{CustomerDirectory, ProductDirectory, ShopDirectory};
use domain::{
    AddItem, Authorization, CreateOrder, DomainError, ItemSpec, Order, OrderItem, OrderStatus,
    Permission, UpdateOrder,
};
use store::SalesStore;

use crate::convert::{directory_error, store_error};
use crate::notify::NotificationSink;

/// Service owning every order mutation.
///
/// Validates referential integrity through the peer directories, enforces
/// the status state machine and item gating, keeps the total amount in step
/// with the item set, and publishes a status notification after each
/// accepted state change.
pub struct OrderService<S, C, H, P, N> {
    store: S,
    customers: C,
    shops: H,
    products: P,
    notifier: N,
}

impl<S, C, H, P, N> OrderService<S, C, H, P, N>
where
    S: SalesStore,
    C: CustomerDirectory,
    H: ShopDirectory,
    P: ProductDirectory,
    N: NotificationSink,
{
    /// Creates the service over its collaborators.
    pub fn new(store: S, customers: C, shops: H, products: P, notifier: N) -> Self {
        Self {
            store,
            customers,
            shops,
            products,
            notifier,
        }
    }

    /// Creates a new draft order, optionally with initial items.
    #[tracing::instrument(skip(self, authz, cmd))]
    pub async fn create_order(
        &self,
        authz: &Authorization,
        cmd: CreateOrder,
    ) -> Result<Order, DomainError> {
        authz.require(Permission::CreateSalesOrder)?;

        let customer_id = cmd
            .customer_id
            .ok_or_else(|| DomainError::invalid_input("Customer ID is required"))?;
        let shop_id = cmd
            .shop_id
            .ok_or_else(|| DomainError::invalid_input("Shop ID is required"))?;
        for spec in &cmd.items {
            spec.require_complete()?;
        }

        self.ensure_customer(customer_id).await?;
        self.ensure_shop(shop_id).await?;

        let order_date = cmd.order_date.unwrap_or_else(|| Utc::now().date_naive());
        let mut order = Order::new(customer_id, shop_id, order_date);

        let mut items = Vec::with_capacity(cmd.items.len());
        for spec in &cmd.items {
            items.push(self.build_item(spec).await?);
        }
        order.replace_items(items);

        let order = self.store.insert_order(order).await.map_err(store_error)?;
        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order.id, total = %order.total_amount, "sales order created");
        Ok(order)
    }

    /// Loads an order by id.
    #[tracing::instrument(skip(self, authz))]
    pub async fn get_order(
        &self,
        authz: &Authorization,
        id: OrderId,
    ) -> Result<Order, DomainError> {
        authz.require(Permission::ReadSalesOrder)?;
        self.load_order(id).await
    }

    /// Lists orders one page at a time.
    #[tracing::instrument(skip(self, authz))]
    pub async fn list_orders(
        &self,
        authz: &Authorization,
        page: PageRequest,
    ) -> Result<Page<Order>, DomainError> {
        authz.require(Permission::ReadSalesOrder)?;
        self.store.list_orders(page).await.map_err(store_error)
    }

    /// Applies field changes, an optional status transition, and an optional
    /// all-or-nothing item replacement; always publishes after saving.
    #[tracing::instrument(skip(self, authz, cmd))]
    pub async fn update_order(
        &self,
        authz: &Authorization,
        id: OrderId,
        cmd: UpdateOrder,
    ) -> Result<Order, DomainError> {
        authz.require(Permission::UpdateSalesOrder)?;

        if let Some(specs) = &cmd.items {
            for spec in specs {
                spec.require_complete()?;
            }
        }

        let mut order = self.load_order(id).await?;

        if let Some(customer_id) = cmd.customer_id {
            self.ensure_customer(customer_id).await?;
            order.customer_id = customer_id;
        }
        if let Some(shop_id) = cmd.shop_id {
            self.ensure_shop(shop_id).await?;
            order.shop_id = shop_id;
        }
        if let Some(order_date) = cmd.order_date {
            order.order_date = order_date;
        }
        if let Some(status) = cmd.status {
            OrderStatus::validate_transition(order.status, status)?;
            order.status = status;
        }

        if let Some(specs) = &cmd.items {
            let mut items = Vec::with_capacity(specs.len());
            for spec in specs {
                items.push(self.build_item(spec).await?);
            }
            order.replace_items(items);
        }

        let order = self.store.update_order(order).await.map_err(store_error)?;
        self.notifier.publish(order.id, order.status);
        Ok(order)
    }

    /// Appends one item to a draft order.
    #[tracing::instrument(skip(self, authz, request))]
    pub async fn add_order_item(
        &self,
        authz: &Authorization,
        order_id: OrderId,
        request: AddItem,
    ) -> Result<Order, DomainError> {
        authz.require(Permission::UpdateSalesOrder)?;

        let mut order = self.load_order(order_id).await?;
        // Status gating comes before item validation so a confirmed order is
        // reported as such even when the item data is also bad.
        order.ensure_can_add_items()?;

        let item = self.build_item(&request).await?;
        order.add_item(item)?;

        let order = self.store.update_order(order).await.map_err(store_error)?;
        self.notifier.publish(order.id, order.status);
        Ok(order)
    }

    /// Removes one item from a draft order.
    #[tracing::instrument(skip(self, authz))]
    pub async fn delete_order_item(
        &self,
        authz: &Authorization,
        order_id: OrderId,
        item_id: OrderItemId,
    ) -> Result<Order, DomainError> {
        authz.require(Permission::UpdateSalesOrder)?;

        let mut order = self.load_order(order_id).await?;
        order.ensure_can_delete_items()?;
        order.remove_item(item_id)?;

        let order = self.store.update_order(order).await.map_err(store_error)?;
        self.notifier.publish(order.id, order.status);
        Ok(order)
    }

    /// Confirms an order once its invoice is fully paid.
    ///
    /// This is the only sanctioned path into `Confirmed`: it requires an
    /// invoice to exist and to be paid, and rejects re-confirmation.
    #[tracing::instrument(skip(self, authz))]
    pub async fn confirm_order_after_payment(
        &self,
        authz: &Authorization,
        order_id: OrderId,
    ) -> Result<Order, DomainError> {
        authz.require(Permission::ConfirmSalesOrder)?;

        let mut order = self.load_order(order_id).await?;

        let invoice = self
            .store
            .find_invoice_by_order(order_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| {
                DomainError::not_found(format!("No invoice found for sales order {order_id}"))
            })?;

        if !invoice.is_paid() {
            return Err(DomainError::conflict(format!(
                "Invoice for sales order {order_id} is not fully paid. Current status: {}",
                invoice.payment_status
            )));
        }
        if order.status == OrderStatus::Confirmed {
            return Err(DomainError::conflict(format!(
                "Sales order {order_id} is already confirmed"
            )));
        }

        order.status = OrderStatus::Confirmed;
        order.recalculate_total();

        let order = self.store.update_order(order).await.map_err(store_error)?;
        self.notifier.publish(order.id, order.status);
        metrics::counter!("orders_confirmed_total").increment(1);
        tracing::info!(order_id = %order.id, "sales order confirmed");
        Ok(order)
    }

    /// Deletes a draft, never-invoiced order together with its items.
    #[tracing::instrument(skip(self, authz))]
    pub async fn delete_order(
        &self,
        authz: &Authorization,
        id: OrderId,
    ) -> Result<(), DomainError> {
        authz.require(Permission::DeleteSalesOrder)?;

        let order = self.load_order(id).await?;

        let invoiced = self
            .store
            .invoice_exists_for_order(id)
            .await
            .map_err(store_error)?;
        if invoiced {
            return Err(DomainError::conflict(
                "Cannot delete sales order with associated invoices",
            ));
        }
        if order.status != OrderStatus::Draft {
            return Err(DomainError::conflict("Only DRAFT orders can be deleted"));
        }

        self.store.delete_order(id).await.map_err(store_error)?;
        Ok(())
    }

    async fn load_order(&self, id: OrderId) -> Result<Order, DomainError> {
        self.store
            .get_order(id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| DomainError::not_found(format!("Sales order with ID {id} not found")))
    }

    async fn ensure_customer(&self, id: CustomerId) -> Result<(), DomainError> {
        let exists = self.customers.exists(id).await.map_err(directory_error)?;
        if !exists {
            return Err(DomainError::not_found(format!(
                "Customer with ID {id} not found"
            )));
        }
        Ok(())
    }

    async fn ensure_shop(&self, id: ShopId) -> Result<(), DomainError> {
        let exists = self.shops.exists(id).await.map_err(directory_error)?;
        if !exists {
            return Err(DomainError::not_found(format!("Shop with ID {id} not found")));
        }
        Ok(())
    }

    async fn ensure_product(&self, id: ProductId) -> Result<(), DomainError> {
        let exists = self.products.exists(id).await.map_err(directory_error)?;
        if !exists {
            return Err(DomainError::not_found(format!(
                "Product with ID {id} not found"
            )));
        }
        Ok(())
    }

    /// Validates one item spec end to end and constructs the line item, with
    /// the total price derived from quantity and unit price.
    async fn build_item(&self, spec: &ItemSpec) -> Result<OrderItem, DomainError> {
        let (product_id, quantity, unit_price) = spec.validated()?;
        self.ensure_product(product_id).await?;
        Ok(OrderItem::new(product_id, quantity, unit_price))
    }
}
