//! GET /api/cart/current: the agent's persisted cart.
//!
//! The query string (`?t=<cache-bust>`) is ignored. Every store failure is
//! logged and answered with the empty cart, so callers always get `200 OK`
//! and cannot tell an empty cart from an unreadable one.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json},
};
use cart_sync_core::CartDocument;

use crate::router::AppState;

pub async fn current_cart(State(state): State<AppState>) -> impl IntoResponse {
    let doc = match state.store.load_or_init().await {
        Ok(doc) => {
            tracing::debug!(
                location = %state.store.location(),
                items = doc.items.len(),
                "serving cart"
            );
            doc
        }
        Err(e) => {
            tracing::error!(
                location = %state.store.location(),
                error = %e,
                "cart store unreadable, serving empty cart"
            );
            CartDocument::empty()
        }
    };

    ([(header::CACHE_CONTROL, "no-store")], Json(doc))
}
