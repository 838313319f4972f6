use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use common::{InvoiceId, OrderId, OrderItemId, Page, PageRequest, Version};
use domain::{Invoice, Money, Order, OrderItem, OrderStatus, PaymentStatus};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::{InvoiceStore, OrderStore, Result, StoreError};

/// PostgreSQL-backed store implementation.
///
/// Every trait operation runs inside a single transaction, so each engine
/// operation is one atomic unit of work against the database.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database and returns a store.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: &PgRow) -> Result<Order> {
        let status_name: String = row.try_get("status")?;
        let status = OrderStatus::parse(&status_name)
            .ok_or_else(|| StoreError::InvalidRow(format!("unknown order status {status_name}")))?;
        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            customer_id: row.try_get::<Uuid, _>("customer_id")?.into(),
            shop_id: row.try_get::<Uuid, _>("shop_id")?.into(),
            order_date: row.try_get("order_date")?,
            status,
            total_amount: Money::from_cents(row.try_get("total_amount_cents")?),
            items: Vec::new(),
            version: Version::new(row.try_get("version")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_item(row: &PgRow) -> Result<OrderItem> {
        Ok(OrderItem {
            id: OrderItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
            product_id: row.try_get::<Uuid, _>("product_id")?.into(),
            quantity: row.try_get::<i32, _>("quantity")? as u32,
            unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
            total_price: Money::from_cents(row.try_get("total_price_cents")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_invoice(row: &PgRow) -> Result<Invoice> {
        let status_name: String = row.try_get("payment_status")?;
        let payment_status = PaymentStatus::parse(&status_name).ok_or_else(|| {
            StoreError::InvalidRow(format!("unknown payment status {status_name}"))
        })?;
        Ok(Invoice {
            id: InvoiceId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("sales_order_id")?),
            invoice_date: row.try_get("invoice_date")?,
            payment_status,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn insert_items(
        tx: &mut Transaction<'_, Postgres>,
        order_id: OrderId,
        items: &[OrderItem],
    ) -> Result<()> {
        for item in items {
            sqlx::query(
                r#"
                INSERT INTO sales_order_items
                    (id, sales_order_id, product_id, quantity, unit_price_cents, total_price_cents, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(order_id.as_uuid())
            .bind(item.product_id.as_uuid())
            .bind(item.quantity as i32)
            .bind(item.unit_price.cents())
            .bind(item.total_price.cents())
            .bind(item.created_at)
            .bind(item.updated_at)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Version-checked order write inside an open transaction; shared by the
    /// plain update and the atomic invoice-creation step.
    async fn write_order(tx: &mut Transaction<'_, Postgres>, mut order: Order) -> Result<Order> {
        let next = order.version.next();
        order.updated_at = Utc::now();

        let updated = sqlx::query(
            r#"
            UPDATE sales_orders
            SET customer_id = $1, shop_id = $2, order_date = $3, status = $4,
                total_amount_cents = $5, version = $6, updated_at = $7
            WHERE id = $8 AND version = $9
            "#,
        )
        .bind(order.customer_id.as_uuid())
        .bind(order.shop_id.as_uuid())
        .bind(order.order_date)
        .bind(order.status.as_str())
        .bind(order.total_amount.cents())
        .bind(next.as_i64())
        .bind(order.updated_at)
        .bind(order.id.as_uuid())
        .bind(order.version.as_i64())
        .execute(&mut **tx)
        .await?;

        if updated.rows_affected() == 0 {
            let actual: Option<i64> =
                sqlx::query_scalar("SELECT version FROM sales_orders WHERE id = $1")
                    .bind(order.id.as_uuid())
                    .fetch_optional(&mut **tx)
                    .await?;
            return Err(StoreError::ConcurrencyConflict {
                order_id: order.id,
                expected: order.version,
                actual: actual.map(Version::new).unwrap_or(Version::initial()),
            });
        }

        sqlx::query("DELETE FROM sales_order_items WHERE sales_order_id = $1")
            .bind(order.id.as_uuid())
            .execute(&mut **tx)
            .await?;
        Self::insert_items(tx, order.id, &order.items).await?;

        order.version = next;
        Ok(order)
    }

    async fn load_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query(
            "SELECT * FROM sales_order_items WHERE sales_order_id = $1 ORDER BY created_at, id",
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_item).collect()
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn insert_order(&self, mut order: Order) -> Result<Order> {
        order.version = Version::first();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales_orders
                (id, customer_id, shop_id, order_date, status, total_amount_cents, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.customer_id.as_uuid())
        .bind(order.shop_id.as_uuid())
        .bind(order.order_date)
        .bind(order.status.as_str())
        .bind(order.total_amount.cents())
        .bind(order.version.as_i64())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        Self::insert_items(&mut tx, order.id, &order.items).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM sales_orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut order = Self::row_to_order(&row)?;
        order.items = self.load_items(id).await?;
        Ok(Some(order))
    }

    async fn list_orders(&self, page: PageRequest) -> Result<Page<Order>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales_orders")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(
            "SELECT * FROM sales_orders ORDER BY created_at, id LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut orders = rows
            .iter()
            .map(Self::row_to_order)
            .collect::<Result<Vec<Order>>>()?;

        let ids: Vec<Uuid> = orders.iter().map(|order| order.id.as_uuid()).collect();
        let item_rows = sqlx::query(
            "SELECT * FROM sales_order_items WHERE sales_order_id = ANY($1) ORDER BY created_at, id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in &item_rows {
            let order_id: Uuid = row.try_get("sales_order_id")?;
            by_order
                .entry(order_id)
                .or_default()
                .push(Self::row_to_item(row)?);
        }
        for order in &mut orders {
            order.items = by_order.remove(&order.id.as_uuid()).unwrap_or_default();
        }

        Ok(Page::new(orders, page, total as u64))
    }

    async fn update_order(&self, order: Order) -> Result<Order> {
        let mut tx = self.pool.begin().await?;
        let order = Self::write_order(&mut tx, order).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn delete_order(&self, id: OrderId) -> Result<bool> {
        // Items cascade via the foreign key.
        let deleted = sqlx::query("DELETE FROM sales_orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(deleted.rows_affected() > 0)
    }
}

#[async_trait]
impl InvoiceStore for PostgresStore {
    async fn insert_invoice_with_order(
        &self,
        invoice: Invoice,
        order: Order,
    ) -> Result<(Invoice, Order)> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO invoices
                (id, sales_order_id, invoice_date, payment_status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(invoice.id.as_uuid())
        .bind(invoice.order_id.as_uuid())
        .bind(invoice.invoice_date)
        .bind(invoice.payment_status.as_str())
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("unique_invoice_sales_order")
            {
                return StoreError::DuplicateInvoice(invoice.order_id);
            }
            StoreError::Database(e)
        })?;

        let order = Self::write_order(&mut tx, order).await?;
        tx.commit().await?;
        Ok((invoice, order))
    }

    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>> {
        let row = sqlx::query("SELECT * FROM invoices WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_invoice).transpose()
    }

    async fn list_invoices(&self, page: PageRequest) -> Result<Page<Invoice>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query("SELECT * FROM invoices ORDER BY created_at, id LIMIT $1 OFFSET $2")
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let invoices = rows
            .iter()
            .map(Self::row_to_invoice)
            .collect::<Result<Vec<Invoice>>>()?;
        Ok(Page::new(invoices, page, total as u64))
    }

    async fn update_invoice(&self, mut invoice: Invoice) -> Result<Option<Invoice>> {
        invoice.updated_at = Utc::now();
        let updated = sqlx::query(
            r#"
            UPDATE invoices
            SET sales_order_id = $1, invoice_date = $2, payment_status = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(invoice.order_id.as_uuid())
        .bind(invoice.invoice_date)
        .bind(invoice.payment_status.as_str())
        .bind(invoice.updated_at)
        .bind(invoice.id.as_uuid())
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(invoice))
    }

    async fn delete_invoice(&self, id: InvoiceId) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(deleted.rows_affected() > 0)
    }

    async fn invoice_exists_for_order(&self, order_id: OrderId) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM invoices WHERE sales_order_id = $1)")
                .bind(order_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_invoice_by_order(&self, order_id: OrderId) -> Result<Option<Invoice>> {
        let row = sqlx::query("SELECT * FROM invoices WHERE sales_order_id = $1")
            .bind(order_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_invoice).transpose()
    }
}
