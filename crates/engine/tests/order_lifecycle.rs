//! Lifecycle tests for the order service against in-memory collaborators.

use chrono::{NaiveDate, Utc};
use common::{CustomerId, OrderId, OrderItemId, PageRequest, ProductId, ShopId};
use directory::{InMemoryCustomerDirectory, InMemoryProductDirectory, InMemoryShopDirectory};
use domain::{
    AddItem, Authorization, CreateOrder, DomainError, ItemSpec, Money, OrderStatus, Permission,
    UpdateOrder,
};
use engine::{InvoiceService, OrderService, RecordingSink};
use store::{InMemoryStore, OrderStore};

type TestOrderService = OrderService<
    InMemoryStore,
    InMemoryCustomerDirectory,
    InMemoryShopDirectory,
    InMemoryProductDirectory,
    RecordingSink,
>;

struct Fixture {
    store: InMemoryStore,
    customers: InMemoryCustomerDirectory,
    shops: InMemoryShopDirectory,
    products: InMemoryProductDirectory,
    sink: RecordingSink,
    orders: TestOrderService,
    invoices: InvoiceService<InMemoryStore, RecordingSink>,
    authz: Authorization,
}

fn fixture() -> Fixture {
    let store = InMemoryStore::new();
    let customers = InMemoryCustomerDirectory::new();
    let shops = InMemoryShopDirectory::new();
    let products = InMemoryProductDirectory::new();
    let sink = RecordingSink::new();
    let orders = OrderService::new(
        store.clone(),
        customers.clone(),
        shops.clone(),
        products.clone(),
        sink.clone(),
    );
    let invoices = InvoiceService::new(store.clone(), sink.clone());
    Fixture {
        store,
        customers,
        shops,
        products,
        sink,
        orders,
        invoices,
        authz: Authorization::all(),
    }
}

fn one_item(quantity: i32, unit_cents: i64) -> ItemSpec {
    ItemSpec::new(ProductId::new(), quantity, Money::from_cents(unit_cents))
}

async fn draft_order(fx: &Fixture) -> common::OrderId {
    let cmd = CreateOrder::new(CustomerId::new(), ShopId::new()).with_items([one_item(2, 1000)]);
    fx.orders.create_order(&fx.authz, cmd).await.unwrap().id
}

mod create {
    use super::*;

    #[tokio::test]
    async fn order_with_one_item_lands_in_draft_with_computed_total() {
        let fx = fixture();
        let customer_id = CustomerId::new();
        let shop_id = ShopId::new();
        let product_id = ProductId::new();

        let cmd = CreateOrder::new(customer_id, shop_id)
            .with_items([ItemSpec::new(product_id, 2, Money::from_cents(1000))]);
        let order = fx.orders.create_order(&fx.authz, cmd).await.unwrap();

        assert_eq!(order.status, OrderStatus::Draft);
        assert_eq!(order.customer_id, customer_id);
        assert_eq!(order.shop_id, shop_id);
        assert_eq!(order.total_amount, Money::from_cents(2000));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product_id, product_id);
        assert_eq!(order.items[0].total_price, Money::from_cents(2000));
    }

    #[tokio::test]
    async fn empty_order_has_zero_total() {
        let fx = fixture();
        let cmd = CreateOrder::new(CustomerId::new(), ShopId::new());
        let order = fx.orders.create_order(&fx.authz, cmd).await.unwrap();
        assert!(order.items.is_empty());
        assert!(order.total_amount.is_zero());
    }

    #[tokio::test]
    async fn order_date_defaults_to_today() {
        let fx = fixture();
        let cmd = CreateOrder::new(CustomerId::new(), ShopId::new());
        let order = fx.orders.create_order(&fx.authz, cmd).await.unwrap();
        assert_eq!(order.order_date, Utc::now().date_naive());

        let explicit = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let cmd = CreateOrder::new(CustomerId::new(), ShopId::new()).with_order_date(explicit);
        let order = fx.orders.create_order(&fx.authz, cmd).await.unwrap();
        assert_eq!(order.order_date, explicit);
    }

    #[tokio::test]
    async fn missing_ids_are_invalid_input() {
        let fx = fixture();

        let cmd = CreateOrder {
            shop_id: Some(ShopId::new()),
            ..CreateOrder::default()
        };
        let err = fx.orders.create_order(&fx.authz, cmd).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(err.to_string(), "Customer ID is required");

        let cmd = CreateOrder {
            customer_id: Some(CustomerId::new()),
            ..CreateOrder::default()
        };
        let err = fx.orders.create_order(&fx.authz, cmd).await.unwrap_err();
        assert_eq!(err.to_string(), "Shop ID is required");
    }

    #[tokio::test]
    async fn unresolved_customer_aborts_before_any_write() {
        let fx = fixture();
        let customer_id = CustomerId::new();
        fx.customers.mark_missing(customer_id);

        let cmd = CreateOrder::new(customer_id, ShopId::new()).with_items([one_item(1, 100)]);
        let err = fx.orders.create_order(&fx.authz, cmd).await.unwrap_err();

        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(err.to_string(), format!("Customer with ID {customer_id} not found"));
        assert_eq!(fx.store.order_count().await, 0);
    }

    #[tokio::test]
    async fn unresolved_product_aborts_before_any_write() {
        let fx = fixture();
        let product_id = ProductId::new();
        fx.products.mark_missing(product_id);

        let cmd = CreateOrder::new(CustomerId::new(), ShopId::new())
            .with_items([ItemSpec::new(product_id, 1, Money::from_cents(100))]);
        let err = fx.orders.create_order(&fx.authz, cmd).await.unwrap_err();

        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(fx.store.order_count().await, 0);
    }

    #[tokio::test]
    async fn directory_outage_is_a_validation_failure() {
        let fx = fixture();
        fx.shops.set_unavailable(true);

        let cmd = CreateOrder::new(CustomerId::new(), ShopId::new());
        let err = fx.orders.create_order(&fx.authz, cmd).await.unwrap_err();

        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert_eq!(err.to_string(), "Server error: shop directory unavailable");
        assert_eq!(fx.store.order_count().await, 0);
    }

    #[tokio::test]
    async fn incomplete_item_spec_is_rejected() {
        let fx = fixture();
        let cmd = CreateOrder::new(CustomerId::new(), ShopId::new()).with_items([ItemSpec {
            product_id: Some(ProductId::new()),
            quantity: Some(1),
            unit_price: None,
        }]);
        let err = fx.orders.create_order(&fx.authz, cmd).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid item data: product ID, quantity, and unit price are required"
        );
    }

    #[tokio::test]
    async fn non_positive_quantity_and_price_are_rejected() {
        let fx = fixture();

        let cmd = CreateOrder::new(CustomerId::new(), ShopId::new()).with_items([one_item(0, 100)]);
        let err = fx.orders.create_order(&fx.authz, cmd).await.unwrap_err();
        assert_eq!(err.to_string(), "Quantity must be greater than zero");

        let cmd = CreateOrder::new(CustomerId::new(), ShopId::new()).with_items([one_item(1, 0)]);
        let err = fx.orders.create_order(&fx.authz, cmd).await.unwrap_err();
        assert_eq!(err.to_string(), "Unit price must be greater than zero");
    }

    #[tokio::test]
    async fn create_publishes_no_notification() {
        let fx = fixture();
        draft_order(&fx).await;
        assert_eq!(fx.sink.count(), 0);
    }

    #[tokio::test]
    async fn missing_permission_is_forbidden() {
        let fx = fixture();
        let authz = Authorization::granting([Permission::ReadSalesOrder]);
        let cmd = CreateOrder::new(CustomerId::new(), ShopId::new());
        let err = fx.orders.create_order(&authz, cmd).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }
}

mod read {
    use super::*;

    #[tokio::test]
    async fn get_order_roundtrip_and_not_found() {
        let fx = fixture();
        let id = draft_order(&fx).await;

        let order = fx.orders.get_order(&fx.authz, id).await.unwrap();
        assert_eq!(order.id, id);

        let missing = OrderId::new();
        let err = fx.orders.get_order(&fx.authz, missing).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Sales order with ID {missing} not found")
        );
    }

    #[tokio::test]
    async fn list_orders_pages_through_everything() {
        let fx = fixture();
        for _ in 0..5 {
            draft_order(&fx).await;
        }

        let page = fx
            .orders
            .list_orders(&fx.authz, PageRequest::new(0, 3))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages(), 2);
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn field_changes_are_applied_and_published() {
        let fx = fixture();
        let id = draft_order(&fx).await;
        let new_customer = CustomerId::new();
        let new_date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let cmd = UpdateOrder {
            customer_id: Some(new_customer),
            order_date: Some(new_date),
            ..UpdateOrder::default()
        };
        let order = fx.orders.update_order(&fx.authz, id, cmd).await.unwrap();

        assert_eq!(order.customer_id, new_customer);
        assert_eq!(order.order_date, new_date);
        // The update path publishes unconditionally, even without a status change.
        assert_eq!(fx.sink.count(), 1);
        assert_eq!(fx.sink.events()[0].status, OrderStatus::Draft);
    }

    #[tokio::test]
    async fn status_transition_to_pending_is_accepted() {
        let fx = fixture();
        let id = draft_order(&fx).await;

        let order = fx
            .orders
            .update_order(&fx.authz, id, UpdateOrder::status(OrderStatus::Pending))
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(fx.sink.events()[0].status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn confirmed_order_only_transitions_to_cancelled() {
        let fx = fixture();
        let id = draft_order(&fx).await;
        // The generic update path permits a direct jump to CONFIRMED.
        fx.orders
            .update_order(&fx.authz, id, UpdateOrder::status(OrderStatus::Confirmed))
            .await
            .unwrap();

        let err = fx
            .orders
            .update_order(&fx.authz, id, UpdateOrder::status(OrderStatus::Pending))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::IllegalStateTransition(_)));
        assert_eq!(
            err.to_string(),
            "Confirmed orders can only be transitioned to CANCELLED"
        );

        let order = fx
            .orders
            .update_order(&fx.authz, id, UpdateOrder::status(OrderStatus::Cancelled))
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancelled_order_is_frozen() {
        let fx = fixture();
        let id = draft_order(&fx).await;
        fx.orders
            .update_order(&fx.authz, id, UpdateOrder::status(OrderStatus::Cancelled))
            .await
            .unwrap();

        for requested in [OrderStatus::Draft, OrderStatus::Pending, OrderStatus::Confirmed] {
            let err = fx
                .orders
                .update_order(&fx.authz, id, UpdateOrder::status(requested))
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Cancelled orders cannot be modified");
        }
    }

    #[tokio::test]
    async fn item_replacement_is_all_or_nothing() {
        let fx = fixture();
        let id = draft_order(&fx).await;
        let bad_product = ProductId::new();
        fx.products.mark_missing(bad_product);

        let cmd = UpdateOrder::items([
            one_item(1, 500),
            ItemSpec::new(bad_product, 1, Money::from_cents(100)),
        ]);
        let err = fx.orders.update_order(&fx.authz, id, cmd).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        // The prior item set and total are retained.
        let order = fx.store.get_order(id).await.unwrap().unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total_amount, Money::from_cents(2000));
    }

    #[tokio::test]
    async fn empty_item_list_clears_the_order() {
        let fx = fixture();
        let id = draft_order(&fx).await;

        let order = fx
            .orders
            .update_order(&fx.authz, id, UpdateOrder::items([]))
            .await
            .unwrap();
        assert!(order.items.is_empty());
        assert!(order.total_amount.is_zero());
    }

    #[tokio::test]
    async fn replacement_recomputes_total_from_new_set() {
        let fx = fixture();
        let id = draft_order(&fx).await;

        let order = fx
            .orders
            .update_order(
                &fx.authz,
                id,
                UpdateOrder::items([one_item(3, 200), one_item(1, 150)]),
            )
            .await
            .unwrap();

        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total_amount, Money::from_cents(750));
        let expected: Money = order.items.iter().map(|i| i.total_price).sum();
        assert_eq!(order.total_amount, expected);
    }

    #[tokio::test]
    async fn new_customer_reference_is_revalidated() {
        let fx = fixture();
        let id = draft_order(&fx).await;
        let unknown = CustomerId::new();
        fx.customers.mark_missing(unknown);

        let cmd = UpdateOrder {
            customer_id: Some(unknown),
            ..UpdateOrder::default()
        };
        let err = fx.orders.update_order(&fx.authz, id, cmd).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        let order = fx.store.get_order(id).await.unwrap().unwrap();
        assert_ne!(order.customer_id, unknown);
    }
}

mod items {
    use super::*;

    #[tokio::test]
    async fn add_item_recomputes_total_and_publishes() {
        let fx = fixture();
        let id = draft_order(&fx).await;

        let order = fx
            .orders
            .add_order_item(&fx.authz, id, AddItem::new(ProductId::new(), 3, Money::from_cents(500)))
            .await
            .unwrap();

        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total_amount, Money::from_cents(3500));
        assert_eq!(fx.sink.count(), 1);
        assert_eq!(fx.sink.events()[0].order_id, id);
    }

    #[tokio::test]
    async fn add_item_rejected_per_status_with_distinct_messages() {
        let fx = fixture();
        for (status, expected) in [
            (OrderStatus::Pending, "Cannot add items to a pending order"),
            (OrderStatus::Confirmed, "Cannot add items to a confirmed order"),
            (OrderStatus::Cancelled, "Cannot add items to a cancelled order"),
        ] {
            let id = draft_order(&fx).await;
            fx.orders
                .update_order(&fx.authz, id, UpdateOrder::status(status))
                .await
                .unwrap();

            let err = fx
                .orders
                .add_order_item(&fx.authz, id, one_item(1, 100))
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::IllegalStateTransition(_)));
            assert_eq!(err.to_string(), expected);

            // Item set and total unchanged.
            let order = fx.store.get_order(id).await.unwrap().unwrap();
            assert_eq!(order.items.len(), 1);
            assert_eq!(order.total_amount, Money::from_cents(2000));
        }
    }

    #[tokio::test]
    async fn delete_item_recomputes_total() {
        let fx = fixture();
        let id = draft_order(&fx).await;
        let order = fx
            .orders
            .add_order_item(&fx.authz, id, one_item(1, 500))
            .await
            .unwrap();
        let first_item = order.items[0].id;

        let order = fx
            .orders
            .delete_order_item(&fx.authz, id, first_item)
            .await
            .unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total_amount, Money::from_cents(500));
    }

    #[tokio::test]
    async fn delete_item_rejected_per_status_with_distinct_messages() {
        let fx = fixture();
        for (status, expected) in [
            (OrderStatus::Pending, "Cannot delete items from a pending order"),
            (OrderStatus::Confirmed, "Cannot delete items from a confirmed order"),
            (OrderStatus::Cancelled, "Cannot delete items from a cancelled order"),
        ] {
            let id = draft_order(&fx).await;
            let order = fx.orders.get_order(&fx.authz, id).await.unwrap();
            let item_id = order.items[0].id;
            fx.orders
                .update_order(&fx.authz, id, UpdateOrder::status(status))
                .await
                .unwrap();

            let err = fx
                .orders
                .delete_order_item(&fx.authz, id, item_id)
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), expected);
        }
    }

    #[tokio::test]
    async fn delete_unknown_item_is_not_found() {
        let fx = fixture();
        let id = draft_order(&fx).await;
        let missing = OrderItemId::new();

        let err = fx
            .orders
            .delete_order_item(&fx.authz, id, missing)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(
            err.to_string(),
            format!("Sales order item with ID {missing} not found in order {id}")
        );
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn draft_order_without_invoice_is_deleted() {
        let fx = fixture();
        let id = draft_order(&fx).await;

        fx.orders.delete_order(&fx.authz, id).await.unwrap();
        assert!(fx.store.get_order(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invoiced_order_cannot_be_deleted() {
        let fx = fixture();
        let id = draft_order(&fx).await;
        fx.invoices
            .create_invoice(
                &fx.authz,
                domain::CreateInvoice::new(id, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()),
            )
            .await
            .unwrap();

        let err = fx.orders.delete_order(&fx.authz, id).await.unwrap_err();
        assert!(matches!(err, DomainError::ConflictingState(_)));
        assert_eq!(
            err.to_string(),
            "Cannot delete sales order with associated invoices"
        );
    }

    #[tokio::test]
    async fn non_draft_order_cannot_be_deleted() {
        let fx = fixture();
        let id = draft_order(&fx).await;
        fx.orders
            .update_order(&fx.authz, id, UpdateOrder::status(OrderStatus::Pending))
            .await
            .unwrap();

        let err = fx.orders.delete_order(&fx.authz, id).await.unwrap_err();
        assert_eq!(err.to_string(), "Only DRAFT orders can be deleted");
    }
}

mod confirmation {
    use super::*;
    use domain::{CreateInvoice, PaymentStatus, UpdateInvoice};

    async fn invoiced_order(fx: &Fixture) -> (OrderId, common::InvoiceId) {
        let id = draft_order(fx).await;
        let invoice = fx
            .invoices
            .create_invoice(
                &fx.authz,
                CreateInvoice::new(id, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()),
            )
            .await
            .unwrap();
        (id, invoice.id)
    }

    #[tokio::test]
    async fn unpaid_invoice_blocks_confirmation() {
        let fx = fixture();
        let (id, _) = invoiced_order(&fx).await;

        let err = fx
            .orders
            .confirm_order_after_payment(&fx.authz, id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ConflictingState(_)));
        assert_eq!(
            err.to_string(),
            format!("Invoice for sales order {id} is not fully paid. Current status: UNPAID")
        );

        let order = fx.store.get_order(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn paid_invoice_confirms_and_publishes() {
        let fx = fixture();
        let (id, invoice_id) = invoiced_order(&fx).await;
        fx.invoices
            .update_invoice(
                &fx.authz,
                invoice_id,
                UpdateInvoice::payment_status(PaymentStatus::Paid),
            )
            .await
            .unwrap();

        let order = fx
            .orders
            .confirm_order_after_payment(&fx.authz, id)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);

        let last = *fx.sink.events().last().unwrap();
        assert_eq!(last.order_id, id);
        assert_eq!(last.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn second_confirmation_is_rejected_without_republishing() {
        let fx = fixture();
        let (id, invoice_id) = invoiced_order(&fx).await;
        fx.invoices
            .update_invoice(
                &fx.authz,
                invoice_id,
                UpdateInvoice::payment_status(PaymentStatus::Paid),
            )
            .await
            .unwrap();
        fx.orders
            .confirm_order_after_payment(&fx.authz, id)
            .await
            .unwrap();
        let published = fx.sink.count();

        let err = fx
            .orders
            .confirm_order_after_payment(&fx.authz, id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ConflictingState(_)));
        assert_eq!(
            err.to_string(),
            format!("Sales order {id} is already confirmed")
        );
        assert_eq!(fx.sink.count(), published);
    }

    #[tokio::test]
    async fn confirmation_requires_an_invoice() {
        let fx = fixture();
        let id = draft_order(&fx).await;

        let err = fx
            .orders
            .confirm_order_after_payment(&fx.authz, id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(
            err.to_string(),
            format!("No invoice found for sales order {id}")
        );
    }

    #[tokio::test]
    async fn partially_paid_invoice_still_blocks() {
        let fx = fixture();
        let (id, invoice_id) = invoiced_order(&fx).await;
        fx.invoices
            .update_invoice(
                &fx.authz,
                invoice_id,
                UpdateInvoice::payment_status(PaymentStatus::PartiallyPaid),
            )
            .await
            .unwrap();

        let err = fx
            .orders
            .confirm_order_after_payment(&fx.authz, id)
            .await
            .unwrap_err();
        assert!(err.to_string().ends_with("Current status: PARTIALLY_PAID"));
    }
}
