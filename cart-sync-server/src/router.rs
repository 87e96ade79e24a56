//! Router construction for the cart API.

use std::sync::Arc;

use axum::{routing::get, Router};
use cart_sync_core::CartStore;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CartStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn CartStore>) -> Self {
        Self { store }
    }
}

/// Build the full axum router with all routes and middleware.
pub fn build_router(store: Arc<dyn CartStore>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/cart/current", get(handlers::cart::current_cart))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(AppState::new(store))
}
