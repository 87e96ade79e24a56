//! File-backed cart store.
//!
//! The cart is a single pretty-printed JSON document, conventionally
//! `orders/current_cart.json` under the agent backend. The agent writes it
//! after every cart mutation; the HTTP endpoint only reads it, creating an
//! empty document when none exists yet.

use crate::error::{CartError, Result};
use crate::types::CartDocument;
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Default location of the cart document, relative to the working directory.
pub const DEFAULT_CART_PATH: &str = "orders/current_cart.json";

/// Persistence for the current cart document.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Read the document, creating and persisting an empty one if absent.
    async fn load_or_init(&self) -> Result<CartDocument>;

    /// Replace the document.
    async fn save(&self, doc: &CartDocument) -> Result<()>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}

/// [`CartStore`] over one JSON file.
///
/// Every write goes to a fresh temp file in the cart's directory and is then
/// moved into place, so concurrent writers never share a temp path and readers
/// never see a partial document.
#[derive(Debug, Clone)]
pub struct FileCartStore {
    path: PathBuf,
}

/// How a finished temp file replaces the cart document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replace {
    Always,
    /// Only create the document; an existing one wins.
    IfAbsent,
}

impl FileCartStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<CartDocument> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CartError::io(&self.path, e))?;
        let doc: CartDocument = serde_json::from_str(&raw)?;
        Ok(doc)
    }

    /// Returns `false` when `Replace::IfAbsent` found a document already there.
    async fn write(&self, doc: &CartDocument, replace: Replace) -> Result<bool> {
        let body = doc.to_pretty_json()?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_file(&path, body.as_bytes(), replace))
            .await
            .map_err(|e| CartError::io(&self.path, std::io::Error::other(e)))?
    }

    /// Create the empty document unless another writer got there first.
    async fn init_empty(&self) -> Result<CartDocument> {
        let empty = CartDocument::empty();
        if self.write(&empty, Replace::IfAbsent).await? {
            tracing::info!(path = %self.path.display(), "cart file not found, created empty cart");
            Ok(empty)
        } else {
            tracing::debug!(path = %self.path.display(), "cart file appeared during init, reading it");
            self.read().await
        }
    }
}

fn write_file(path: &Path, body: &[u8], replace: Replace) -> Result<bool> {
    let dir = match path.parent().filter(|d| !d.as_os_str().is_empty()) {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| CartError::io(dir, e))?;
            dir
        }
        None => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CartError::io(dir, e))?;
    tmp.write_all(body)
        .and_then(|()| tmp.flush())
        .map_err(|e| CartError::io(tmp.path(), e))?;

    match replace {
        Replace::Always => {
            tmp.persist(path).map_err(|e| CartError::io(path, e.error))?;
            Ok(true)
        }
        Replace::IfAbsent => match tmp.persist_noclobber(path) {
            Ok(_) => Ok(true),
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(CartError::io(path, e.error)),
        },
    }
}

impl Default for FileCartStore {
    fn default() -> Self {
        Self::new(DEFAULT_CART_PATH)
    }
}

#[async_trait]
impl CartStore for FileCartStore {
    async fn load_or_init(&self) -> Result<CartDocument> {
        match self.read().await {
            Ok(doc) => Ok(doc),
            Err(e) if e.is_not_found() => self.init_empty().await,
            Err(e) => Err(e),
        }
    }

    async fn save(&self, doc: &CartDocument) -> Result<()> {
        self.write(doc, Replace::Always).await?;
        tracing::debug!(
            path = %self.path.display(),
            items = doc.items.len(),
            item_count = doc.item_count,
            "cart saved"
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
