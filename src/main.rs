//! Storefront API server

use std::sync::Arc;

use anyhow::{Context, Result};
use storefront_api::{
    config::{Config, StoreBackend},
    services::TokenIssuer,
    store::{MemoryStore, PgStore, Store},
    router, AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "storefront_api=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("loading configuration")?;
    let store: Arc<dyn Store> = match config.backend {
        StoreBackend::Postgres => {
            let url = config.database_url.as_ref().context("DATABASE_URL is required for the postgres backend")?;
            let store = PgStore::connect(url, config.database_max_connections, config.store_timeout).await.context("connecting to database")?;
            store.migrate().await.context("running migrations")?;
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store, TokenIssuer::new(&config.secret_key));
    let app = router(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, backend = ?config.backend, "storefront api listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
