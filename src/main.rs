use anyhow::Result;
use shipline::config::AppConfig;
use shipline::gateway::{HttpShipmentGateway, ShipmentGateway};
use shipline::server::{AppState, build_router};
use shipline::service::{OrderService, ProductService};
use shipline::storage::{OrderStore, ProductStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,tower=warn")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let gateway: Arc<dyn ShipmentGateway> =
        Arc::new(HttpShipmentGateway::new(&config.shipment_base_url)?);

    let (product_store, order_store) = build_stores(&config).await?;
    let state = AppState::new(
        OrderService::new(order_store, product_store.clone(), gateway),
        ProductService::new(product_store),
    );

    let app = build_router(state);
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

#[cfg(feature = "postgres")]
async fn build_stores(
    config: &AppConfig,
) -> Result<(Arc<dyn ProductStore>, Arc<dyn OrderStore>)> {
    use shipline::storage::{
        InMemoryOrderStore, InMemoryProductStore, PostgresOrderStore, PostgresProductStore,
    };
    use sqlx::postgres::PgPoolOptions;

    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
            shipline::storage::ensure_schema(&pool).await?;
            tracing::info!("Using Postgres storage");
            Ok((
                Arc::new(PostgresProductStore::new(pool.clone())),
                Arc::new(PostgresOrderStore::new(pool)),
            ))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, falling back to in-memory storage");
            Ok((
                Arc::new(InMemoryProductStore::new()),
                Arc::new(InMemoryOrderStore::new()),
            ))
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_stores(
    config: &AppConfig,
) -> Result<(Arc<dyn ProductStore>, Arc<dyn OrderStore>)> {
    use shipline::storage::{InMemoryOrderStore, InMemoryProductStore};

    if config.database_url.is_some() {
        tracing::warn!(
            "DATABASE_URL is set but the binary was built without the postgres feature; \
             using in-memory storage"
        );
    }
    Ok((
        Arc::new(InMemoryProductStore::new()),
        Arc::new(InMemoryOrderStore::new()),
    ))
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        },
    }
}
