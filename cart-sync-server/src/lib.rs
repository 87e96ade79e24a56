//! cart-sync-server: HTTP side channel for the agent's cart.
//!
//! Serves the file-backed cart document at `GET /api/cart/current` for display
//! surfaces that cannot observe the chat transcript.

pub mod config;
pub mod handlers;
pub mod router;

pub use config::ServerConfig;
pub use router::{build_router, AppState};
