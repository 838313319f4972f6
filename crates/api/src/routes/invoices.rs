//! Invoice endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use chrono::{DateTime, NaiveDate, Utc};
use common::InvoiceId;
use directory::{CustomerDirectory, ProductDirectory, ShopDirectory};
use domain::{CreateInvoice, Invoice, PaymentStatus, UpdateInvoice};
use serde::{Deserialize, Serialize};
use store::SalesStore;
use uuid::Uuid;

use crate::auth;
use crate::error::ApiError;
use crate::routes::orders::{AppState, ListParams, PagedResponse, parse_id};

// -- Request types --

#[derive(Deserialize)]
pub struct CreateInvoiceRequest {
    pub sales_order_id: Option<Uuid>,
    pub invoice_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct UpdateInvoiceRequest {
    pub sales_order_id: Option<Uuid>,
    pub invoice_date: Option<NaiveDate>,
    pub payment_status: Option<PaymentStatus>,
}

// -- Response types --

#[derive(Serialize)]
pub struct InvoiceResponse {
    pub id: String,
    pub sales_order_id: String,
    pub invoice_date: NaiveDate,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn invoice_response(invoice: Invoice) -> InvoiceResponse {
    InvoiceResponse {
        id: invoice.id.to_string(),
        sales_order_id: invoice.order_id.to_string(),
        invoice_date: invoice.invoice_date,
        payment_status: invoice.payment_status.to_string(),
        created_at: invoice.created_at,
        updated_at: invoice.updated_at,
    }
}

// -- Handlers --

/// POST /api/v1/invoices — open an invoice for an order.
#[tracing::instrument(skip_all)]
pub async fn create<S, C, H, P>(
    State(state): State<Arc<AppState<S, C, H, P>>>,
    headers: HeaderMap,
    Json(req): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError>
where
    S: SalesStore + 'static,
    C: CustomerDirectory + 'static,
    H: ShopDirectory + 'static,
    P: ProductDirectory + 'static,
{
    let authz = auth::resolve(&state.auth, &headers)?;
    let cmd = CreateInvoice {
        order_id: req.sales_order_id.map(Into::into),
        invoice_date: req.invoice_date,
    };
    let invoice = state.invoices.create_invoice(&authz, cmd).await?;
    Ok((StatusCode::CREATED, Json(invoice_response(invoice))))
}

/// GET /api/v1/invoices/{id} — load an invoice by id.
#[tracing::instrument(skip_all)]
pub async fn get<S, C, H, P>(
    State(state): State<Arc<AppState<S, C, H, P>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<InvoiceResponse>, ApiError>
where
    S: SalesStore + 'static,
    C: CustomerDirectory + 'static,
    H: ShopDirectory + 'static,
    P: ProductDirectory + 'static,
{
    let authz = auth::resolve(&state.auth, &headers)?;
    let invoice_id = InvoiceId::from_uuid(parse_id(&id)?);
    let invoice = state.invoices.get_invoice(&authz, invoice_id).await?;
    Ok(Json(invoice_response(invoice)))
}

/// GET /api/v1/invoices — paginated listing.
#[tracing::instrument(skip_all)]
pub async fn list<S, C, H, P>(
    State(state): State<Arc<AppState<S, C, H, P>>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<PagedResponse<InvoiceResponse>>, ApiError>
where
    S: SalesStore + 'static,
    C: CustomerDirectory + 'static,
    H: ShopDirectory + 'static,
    P: ProductDirectory + 'static,
{
    let authz = auth::resolve(&state.auth, &headers)?;
    let page = state
        .invoices
        .list_invoices(&authz, params.page_request())
        .await?;

    let total_pages = page.total_pages();
    Ok(Json(PagedResponse {
        page: page.page,
        size: page.size,
        total: page.total,
        total_pages,
        items: page.items.into_iter().map(invoice_response).collect(),
    }))
}

/// PUT /api/v1/invoices/{id} — update an invoice (order reference, date,
/// payment status).
#[tracing::instrument(skip_all)]
pub async fn update<S, C, H, P>(
    State(state): State<Arc<AppState<S, C, H, P>>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateInvoiceRequest>,
) -> Result<Json<InvoiceResponse>, ApiError>
where
    S: SalesStore + 'static,
    C: CustomerDirectory + 'static,
    H: ShopDirectory + 'static,
    P: ProductDirectory + 'static,
{
    let authz = auth::resolve(&state.auth, &headers)?;
    let invoice_id = InvoiceId::from_uuid(parse_id(&id)?);
    let cmd = UpdateInvoice {
        order_id: req.sales_order_id.map(Into::into),
        invoice_date: req.invoice_date,
        payment_status: req.payment_status,
    };
    let invoice = state
        .invoices
        .update_invoice(&authz, invoice_id, cmd)
        .await?;
    Ok(Json(invoice_response(invoice)))
}

/// DELETE /api/v1/invoices/{id} — delete an invoice.
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
    let invoice_id = InvoiceId::from_uuid(parse_id(&id)?);
    state.invoices.delete_invoice(&authz, invoice_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
