//! Agent-side cart ledger.
//!
//! The authoritative cart kept by the conversational agent's backend. Unlike
//! the view model it recomputes totals from its items, keys lines by catalog
//! id (falling back to name), and sums quantities on repeated adds. Every
//! mutation returns the sentence the agent speaks, and the caller persists the
//! ledger through a [`CartStore`] so the polling display can pick it up.

use crate::error::Result;
use crate::store::CartStore;
use crate::templates;
use crate::types::{line_total_sum, quantity_sum, CartDocument, CartItem};
use rust_decimal::Decimal;

/// Outcome of a ledger operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerReply {
    pub success: bool,
    /// Sentence for the agent to speak.
    pub message: String,
}

impl LedgerReply {
    fn ok(message: String) -> Self {
        Self {
            success: true,
            message,
        }
    }

    fn rejected(message: String) -> Self {
        Self {
            success: false,
            message,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CartLedger {
    items: Vec<CartItem>,
}

impl CartLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from a persisted document.
    pub fn from_document(doc: CartDocument) -> Self {
        Self { items: doc.items }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> u64 {
        quantity_sum(&self.items)
    }

    pub fn total(&self) -> Decimal {
        line_total_sum(&self.items)
    }

    fn key_of(item: &CartItem) -> String {
        item.id.clone().unwrap_or_else(|| item.name.to_lowercase())
    }

    /// Exact id match, then case-insensitive name match.
    fn position(&self, query: &str) -> Option<usize> {
        let lowered = query.trim().to_lowercase();
        self.items
            .iter()
            .position(|i| i.id.as_deref() == Some(query))
            .or_else(|| {
                self.items
                    .iter()
                    .position(|i| i.name.to_lowercase() == lowered)
            })
    }

    /// Add `quantity` of `item`; an existing line gains the quantity.
    pub fn add(&mut self, item: CartItem, quantity: u32) -> LedgerReply {
        if quantity == 0 {
            return LedgerReply::rejected(format!("Nothing to add for {}", item.name));
        }

        let key = Self::key_of(&item);
        let in_cart = match self.items.iter_mut().find(|i| Self::key_of(i) == key) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(quantity);
                existing.quantity
            }
            None => {
                self.items.push(CartItem { quantity, ..item.clone() });
                quantity
            }
        };
        tracing::debug!(item = %item.name, quantity, in_cart, "ledger add");
        LedgerReply::ok(templates::added(&item, quantity, in_cart))
    }

    /// Remove the whole line for `query` (id or name).
    pub fn remove(&mut self, query: &str) -> LedgerReply {
        match self.position(query) {
            Some(idx) => {
                let removed = self.items.remove(idx);
                tracing::debug!(item = %removed.name, "ledger remove");
                LedgerReply::ok(templates::removed(&removed.name))
            }
            None => LedgerReply::rejected(templates::not_in_cart(query)),
        }
    }

    /// Set the quantity of an existing line. Zero or less removes it.
    pub fn update_quantity(&mut self, query: &str, quantity: i64) -> LedgerReply {
        if quantity <= 0 {
            return self.remove(query);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.position(query) {
            Some(idx) => {
                self.items[idx].quantity = quantity;
                LedgerReply::ok(templates::updated(&self.items[idx].name, quantity))
            }
            None => LedgerReply::rejected(templates::not_in_cart(query)),
        }
    }

    pub fn clear(&mut self) -> LedgerReply {
        self.items.clear();
        LedgerReply::ok(templates::cleared())
    }

    /// Listing sentence for the current cart.
    pub fn summary(&self) -> String {
        templates::summary(&self.items)
    }

    /// Document with recomputed total and item count.
    pub fn document(&self) -> CartDocument {
        CartDocument::from_items(self.items.clone())
    }

    /// Write the current document to `store`.
    pub async fn persist(&self, store: &dyn CartStore) -> Result<()> {
        store.save(&self.document()).await
    }
}
