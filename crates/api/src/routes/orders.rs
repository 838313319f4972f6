//! Sales order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::{DateTime, NaiveDate, Utc};
use common::{OrderId, OrderItemId, PageRequest};
use directory::{CustomerDirectory, ProductDirectory, ShopDirectory};
use domain::{CreateOrder, ItemSpec, Money, Order, OrderStatus, UpdateOrder};
use engine::{ChannelSink, InvoiceService, OrderService};
use serde::{Deserialize, Serialize};
use store::SalesStore;
use uuid::Uuid;

use crate::auth::{self, AuthConfig};
use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S, C, H, P> {
    pub orders: OrderService<S, C, H, P, ChannelSink>,
    pub invoices: InvoiceService<S, ChannelSink>,
    pub auth: AuthConfig,
}

// -- Request types --

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub unit_price_cents: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: Option<Uuid>,
    pub shop_id: Option<Uuid>,
    pub order_date: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Deserialize)]
pub struct UpdateOrderRequest {
    pub customer_id: Option<Uuid>,
    pub shop_id: Option<Uuid>,
    pub order_date: Option<NaiveDate>,
    pub status: Option<OrderStatus>,
    pub items: Option<Vec<OrderItemRequest>>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl ListParams {
    pub(crate) fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(0), self.size.unwrap_or(20))
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub id: String,
    pub product_id: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub customer_id: String,
    pub shop_id: String,
    pub order_date: NaiveDate,
    pub status: String,
    pub total_amount_cents: i64,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
    pub total_pages: u64,
}

pub(crate) fn order_response(order: Order) -> OrderResponse {
    OrderResponse {
        id: order.id.to_string(),
        customer_id: order.customer_id.to_string(),
        shop_id: order.shop_id.to_string(),
        order_date: order.order_date,
        status: order.status.to_string(),
        total_amount_cents: order.total_amount.cents(),
        items: order
            .items
            .iter()
            .map(|item| OrderItemResponse {
                id: item.id.to_string(),
                product_id: item.product_id.to_string(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price.cents(),
                total_price_cents: item.total_price.cents(),
            })
            .collect(),
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}

fn item_spec(request: &OrderItemRequest) -> ItemSpec {
    ItemSpec {
        product_id: request.product_id.map(Into::into),
        quantity: request.quantity,
        unit_price: request.unit_price_cents.map(Money::from_cents),
    }
}

pub(crate) fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))
}

// -- Handlers --

/// POST /api/v1/sales-orders — create a new order with optional items.
#[tracing::instrument(skip_all)]
pub async fn create<S, C, H, P>(
    State(state): State<Arc<AppState<S, C, H, P>>>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError>
where
    S: SalesStore + 'static,
    C: CustomerDirectory + 'static,
    H: ShopDirectory + 'static,
    P: ProductDirectory + 'static,
{
    let authz = auth::resolve(&state.auth, &headers)?;

    let cmd = CreateOrder {
        customer_id: req.customer_id.map(Into::into),
        shop_id: req.shop_id.map(Into::into),
        order_date: req.order_date,
        items: req.items.iter().map(item_spec).collect(),
    };
    let order = state.orders.create_order(&authz, cmd).await?;
    Ok((StatusCode::CREATED, Json(order_response(order))))
}

/// GET /api/v1/sales-orders/{id} — load an order by id.
#[tracing::instrument(skip_all)]
pub async fn get<S, C, H, P>(
    State(state): State<Arc<AppState<S, C, H, P>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: SalesStore + 'static,
    C: CustomerDirectory + 'static,
    H: ShopDirectory + 'static,
    P: ProductDirectory + 'static,
{
    let authz = auth::resolve(&state.auth, &headers)?;
    let order_id = OrderId::from_uuid(parse_id(&id)?);
    let order = state.orders.get_order(&authz, order_id).await?;
    Ok(Json(order_response(order)))
}

/// GET /api/v1/sales-orders — paginated listing.
#[tracing::instrument(skip_all)]
pub async fn list<S, C, H, P>(
    State(state): State<Arc<AppState<S, C, H, P>>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<PagedResponse<OrderResponse>>, ApiError>
where
    S: SalesStore + 'static,
    C: CustomerDirectory + 'static,
    H: ShopDirectory + 'static,
    P: ProductDirectory + 'static,
{
    let authz = auth::resolve(&state.auth, &headers)?;
    let page = state
        .orders
        .list_orders(&authz, params.page_request())
        .await?;

    let total_pages = page.total_pages();
    Ok(Json(PagedResponse {
        page: page.page,
        size: page.size,
        total: page.total,
        total_pages,
        items: page.items.into_iter().map(order_response).collect(),
    }))
}

/// PUT /api/v1/sales-orders/{id} — general update: fields, status, item
/// replacement.
#[tracing::instrument(skip_all)]
pub async fn update<S, C, H, P>(
    State(state): State<Arc<AppState<S, C, H, P>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateOrderRequest>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: SalesStore + 'static,
    C: CustomerDirectory + 'static,
    H: ShopDirectory + 'static,
    P: ProductDirectory + 'static,
{
    let authz = auth::resolve(&state.auth, &headers)?;
    let order_id = OrderId::from_uuid(parse_id(&id)?);

    let cmd = UpdateOrder {
        customer_id: req.customer_id.map(Into::into),
        shop_id: req.shop_id.map(Into::into),
        order_date: req.order_date,
        status: req.status,
        items: req
            .items
            .as_ref()
            .map(|items| items.iter().map(item_spec).collect()),
    };
    let order = state.orders.update_order(&authz, order_id, cmd).await?;
    Ok(Json(order_response(order)))
}

/// DELETE /api/v1/sales-orders/{id} — delete a draft, never-invoiced order.
#[tracing::instrument(skip_all)]
pub async fn delete<S, C, H, P>(
    State(state): State<Arc<AppState<S, C, H, P>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    S: SalesStore + 'static,
    C: CustomerDirectory + 'static,
    H: ShopDirectory + 'static,
    P: ProductDirectory + 'static,
{
    let authz = auth::resolve(&state.auth, &headers)?;
    let order_id = OrderId::from_uuid(parse_id(&id)?);
    state.orders.delete_order(&authz, order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sales-orders/{id}/items — append one item.
#[tracing::instrument(skip_all)]
pub async fn add_item<S, C, H, P>(
    State(state): State<Arc<AppState<S, C, H, P>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<OrderItemRequest>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: SalesStore + 'static,
    C: CustomerDirectory + 'static,
    H: ShopDirectory + 'static,
    P: ProductDirectory + 'static,
{
    let authz = auth::resolve(&state.auth, &headers)?;
    let order_id = OrderId::from_uuid(parse_id(&id)?);
    let order = state
        .orders
        .add_order_item(&authz, order_id, item_spec(&req))
        .await?;
    Ok(Json(order_response(order)))
}

/// DELETE /api/v1/sales-orders/{order_id}/items/{item_id} — remove one item.
#[tracing::instrument(skip_all)]
pub async fn delete_item<S, C, H, P>(
    State(state): State<Arc<AppState<S, C, H, P>>>,
    headers: HeaderMap,
    Path((order_id, item_id)): Path<(String, String)>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: SalesStore + 'static,
    C: CustomerDirectory + 'static,
    H: ShopDirectory + 'static,
    P: ProductDirectory + 'static,
{
    let authz = auth::resolve(&state.auth, &headers)?;
    let order_id = OrderId::from_uuid(parse_id(&order_id)?);
    let item_id = OrderItemId::from_uuid(parse_id(&item_id)?);
    let order = state
        .orders
        .delete_order_item(&authz, order_id, item_id)
        .await?;
    Ok(Json(order_response(order)))
}

/// POST /api/v1/sales-orders/{id}/confirm — confirm once the invoice is paid.
#[tracing::instrument(skip_all)]
pub async fn confirm<S, C, H, P>(
    State(state): State<Arc<AppState<S, C, H, P>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    S: SalesStore + 'static,
    C: CustomerDirectory + 'static,
    H: ShopDirectory + 'static,
    P: ProductDirectory + 'static,
{
    let authz = auth::resolve(&state.auth, &headers)?;
    let order_id = OrderId::from_uuid(parse_id(&id)?);
    let order = state
        .orders
        .confirm_order_after_payment(&authz, order_id)
        .await?;
    Ok(Json(order_response(order)))
}
