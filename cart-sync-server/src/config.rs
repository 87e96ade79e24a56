//! Server configuration from environment variables.
//!
//!   CART_SYNC_BIND_ADDR  listen address (default: 0.0.0.0:3000)
//!   CART_SYNC_CART_PATH  cart document path (default: orders/current_cart.json)

use cart_sync_core::DEFAULT_CART_PATH;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub cart_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            cart_path: PathBuf::from(DEFAULT_CART_PATH),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            bind_addr: get("CART_SYNC_BIND_ADDR").unwrap_or(defaults.bind_addr),
            cart_path: get("CART_SYNC_CART_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.cart_path),
        }
    }
}
