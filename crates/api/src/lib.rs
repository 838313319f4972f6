//! HTTP shell for the sales-management service.
//!
//! A thin axum layer over the lifecycle engine: request/response shaping,
//! bearer-token permission resolution, domain-error to status mapping, and
//! the health and Prometheus metrics endpoints. All business rules live in
//! the engine.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use directory::{
    CustomerDirectory, InMemoryCustomerDirectory, InMemoryProductDirectory, InMemoryShopDirectory,
    ProductDirectory, ShopDirectory,
};
use engine::{ChannelSink, InvoiceService, LogTransport, OrderService};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{InMemoryStore, SalesStore};
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use auth::AuthConfig;
pub use config::Config;
pub use routes::orders::AppState;

/// Creates the axum application router with all routes and shared state.
pub fn create_app<S, C, H, P>(
    state: Arc<AppState<S, C, H, P>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    S: SalesStore + 'static,
    C: CustomerDirectory + 'static,
    H: ShopDirectory + 'static,
    P: ProductDirectory + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/v1/sales-orders", post(routes::orders::create::<S, C, H, P>))
        .route("/api/v1/sales-orders", get(routes::orders::list::<S, C, H, P>))
        .route("/api/v1/sales-orders/{id}", get(routes::orders::get::<S, C, H, P>))
        .route("/api/v1/sales-orders/{id}", put(routes::orders::update::<S, C, H, P>))
        .route("/api/v1/sales-orders/{id}", delete(routes::orders::delete::<S, C, H, P>))
        .route(
            "/api/v1/sales-orders/{id}/items",
            post(routes::orders::add_item::<S, C, H, P>),
        )
        .route(
            "/api/v1/sales-orders/{order_id}/items/{item_id}",
            delete(routes::orders::delete_item::<S, C, H, P>),
        )
        .route(
            "/api/v1/sales-orders/{id}/confirm",
            post(routes::orders::confirm::<S, C, H, P>),
        )
        .route("/api/v1/invoices", post(routes::invoices::create::<S, C, H, P>))
        .route("/api/v1/invoices", get(routes::invoices::list::<S, C, H, P>))
        .route("/api/v1/invoices/{id}", get(routes::invoices::get::<S, C, H, P>))
        .route("/api/v1/invoices/{id}", put(routes::invoices::update::<S, C, H, P>))
        .route("/api/v1/invoices/{id}", delete(routes::invoices::delete::<S, C, H, P>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Builds the application state over the given collaborators and spawns the
/// notification delivery worker.
pub fn create_state<S, C, H, P>(
    store: S,
    customers: C,
    shops: H,
    products: P,
    auth: AuthConfig,
) -> (Arc<AppState<S, C, H, P>>, JoinHandle<()>)
where
    S: SalesStore + Clone + 'static,
    C: CustomerDirectory + 'static,
    H: ShopDirectory + 'static,
    P: ProductDirectory + 'static,
{
    let (sink, worker) = ChannelSink::spawn(LogTransport);
    let orders = OrderService::new(store.clone(), customers, shops, products, sink.clone());
    let invoices = InvoiceService::new(store, sink);
    let state = Arc::new(AppState {
        orders,
        invoices,
        auth,
    });
    (state, worker)
}

/// State type of the in-memory development/test setup.
pub type InMemoryAppState = AppState<
    InMemoryStore,
    InMemoryCustomerDirectory,
    InMemoryShopDirectory,
    InMemoryProductDirectory,
>;

/// Creates application state backed by an in-memory store and permissive
/// directories.
pub fn create_default_state(auth: AuthConfig) -> (Arc<InMemoryAppState>, JoinHandle<()>) {
    create_state(
        InMemoryStore::new(),
        InMemoryCustomerDirectory::new(),
        InMemoryShopDirectory::new(),
        InMemoryProductDirectory::new(),
        auth,
    )
}
