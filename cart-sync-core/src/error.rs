//! Error types for the cart store and cart sources.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by cart stores and cart sources.
///
/// Nothing here reaches a display surface: the HTTP endpoint and the poller
/// both collapse every variant into an empty cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// Reading or writing the cart document failed.
    #[error("cart store I/O at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cart document is not valid JSON for the cart shape.
    #[error("malformed cart document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but violates the cart shape.
    #[error("invalid cart document: {0}")]
    InvalidDocument(String),

    /// Transport failure while fetching a remote cart.
    #[error("cart fetch failed: {0}")]
    Http(String),

    /// The cart endpoint answered with a non-success status.
    #[error("cart endpoint returned status {0}")]
    Status(u16),
}

impl CartError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the store simply has no document yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, CartError>;
