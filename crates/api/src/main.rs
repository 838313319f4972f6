//! API server entry point.

use api::{AuthConfig, Config};
use directory::{HttpCustomerDirectory, HttpProductDirectory, HttpShopDirectory};
use store::PostgresStore;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

async fn serve(app: axum::Router, config: &Config) {
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    let config = Config::from_env();
    let auth = match &config.jwt_secret {
        Some(secret) => AuthConfig::with_secret(secret),
        None => {
            tracing::warn!("JWT_SECRET not set; granting all permissions to every request");
            AuthConfig::allow_all()
        }
    };

    // 3. Pick the backing store and directories, build state, and serve
    match config.database_url.clone() {
        Some(database_url) => {
            let Some((customers, shops, products)) = config.directory_urls() else {
                tracing::error!(
                    "CUSTOMER_SERVICE_URL, SHOP_SERVICE_URL, and PRODUCT_SERVICE_URL must all \
                     be set when DATABASE_URL is configured"
                );
                std::process::exit(1);
            };

            let store = PostgresStore::connect(&database_url)
                .await
                .expect("failed to connect to database");
            store
                .run_migrations()
                .await
                .expect("failed to run migrations");

            let (state, _notifier) = api::create_state(
                store,
                HttpCustomerDirectory::new(customers),
                HttpShopDirectory::new(shops),
                HttpProductDirectory::new(products),
                auth,
            );
            serve(api::create_app(state, metrics_handle), &config).await;
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store and permissive directories");
            let (state, _notifier) = api::create_default_state(auth);
            serve(api::create_app(state, metrics_handle), &config).await;
        }
    }
}
