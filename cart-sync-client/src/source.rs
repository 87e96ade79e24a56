//! Where a polling panel gets its cart from.

use async_trait::async_trait;
use cart_sync_core::{CartDocument, CartError, Result};
use reqwest::header::{CACHE_CONTROL, PRAGMA};

/// Path of the cart endpoint under the server base URL.
pub const CART_ENDPOINT: &str = "/api/cart/current";

/// One fetch of the current cart.
#[async_trait]
pub trait CartSource: Send + Sync {
    async fn fetch(&self) -> Result<CartDocument>;

    /// Human-readable origin, for logs.
    fn describe(&self) -> String;
}

/// [`CartSource`] over `GET /api/cart/current`.
///
/// Every request carries a `t=<unix millis>` cache-buster plus
/// `Cache-Control: no-cache` and `Pragma: no-cache`.
#[derive(Debug, Clone)]
pub struct HttpCartSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCartSource {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), CART_ENDPOINT),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CartSource for HttpCartSource {
    async fn fetch(&self) -> Result<CartDocument> {
        let cache_bust = chrono::Utc::now().timestamp_millis();
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("t", cache_bust)])
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| CartError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CartError::Status(status.as_u16()));
        }

        resp.json::<CartDocument>()
            .await
            .map_err(|e| CartError::Http(e.to_string()))
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}
