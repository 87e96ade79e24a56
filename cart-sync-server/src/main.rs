//! cart-sync-server: standalone cart API server.
//!
//! Reads config from env vars (a `.env` file is honoured):
//!   CART_SYNC_BIND_ADDR  listen address (default: 0.0.0.0:3000)
//!   CART_SYNC_CART_PATH  cart document path (default: orders/current_cart.json)

use std::sync::Arc;

use anyhow::Context;
use cart_sync_core::{CartStore, FileCartStore};
use cart_sync_server::{build_router, ServerConfig};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cart_sync_server=debug,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env();
    let store: Arc<dyn CartStore> = Arc::new(FileCartStore::new(&config.cart_path));
    tracing::info!(cart_path = %config.cart_path.display(), "using cart store");

    let app = build_router(store);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("cart-sync-server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("cart-sync-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
