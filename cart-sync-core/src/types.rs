//! Cart data model shared by the parser, the view model, the store and the API.
//!
//! The on-disk and on-the-wire shape is the one the agent backend writes:
//!
//! ```json
//! { "items": [ { "name": "Milk", "quantity": 1, "price": 32, "unit": "500ml" } ],
//!   "total": 32,
//!   "item_count": 1 }
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single cart line.
///
/// `name` is a display label, not a stable key. Two spellings of the same
/// product are two different items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub name: String,
    pub quantity: u32,
    /// Price of one unit. Serialized as `price` to match the backend document.
    #[serde(rename = "price", with = "crate::money")]
    pub unit_price: Decimal,
    #[serde(default)]
    pub unit: String,

    /// Catalog id, present on items written by the agent backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Any other catalog fields, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CartItem {
    pub fn new(
        name: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
            unit: unit.into(),
            id: None,
            brand: None,
            category: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// `quantity * unit_price`, `None` when it overflows `Decimal`.
    pub fn checked_line_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }

    /// `quantity * unit_price`, saturating at the `Decimal` bounds.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(self.unit_price)
    }
}

/// Cart as held by the view model for rendering.
///
/// `total` is maintained incrementally by the reducer and is allowed to drift
/// from the sum of line totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub total: Decimal,
}

impl Cart {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all lines (the badge count).
    pub fn item_count(&self) -> u64 {
        quantity_sum(&self.items)
    }

    /// Sum of line totals, independent of the running `total`.
    pub fn computed_total(&self) -> Decimal {
        line_total_sum(&self.items)
    }
}

/// The persisted cart document served by `GET /api/cart/current`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartDocument {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default, with = "crate::money")]
    pub total: Decimal,
    #[serde(default)]
    pub item_count: u64,
}

impl CartDocument {
    /// `{ "items": [], "total": 0, "item_count": 0 }`
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a document whose total and count are recomputed from `items`.
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let total = line_total_sum(&items);
        let item_count = quantity_sum(&items);
        Self {
            items,
            total,
            item_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pretty-printed JSON, the format written to disk.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl From<&Cart> for CartDocument {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items.clone(),
            total: cart.total,
            item_count: cart.item_count(),
        }
    }
}

/// Quantities are chat-supplied `u32`s; widened so the sum cannot wrap.
pub(crate) fn quantity_sum(items: &[CartItem]) -> u64 {
    items
        .iter()
        .fold(0u64, |acc, i| acc.saturating_add(u64::from(i.quantity)))
}

pub(crate) fn line_total_sum(items: &[CartItem]) -> Decimal {
    items
        .iter()
        .fold(Decimal::ZERO, |acc, i| acc.saturating_add(i.line_total()))
}

/// Sender descriptor on a transcript record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageOrigin {
    #[serde(rename = "isLocal", default)]
    pub is_local: bool,
}

/// One record from the external chat transcript feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub from: MessageOrigin,
}

impl ChatMessage {
    /// A message spoken by the remote agent.
    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            message: text.into(),
            from: MessageOrigin { is_local: false },
        }
    }

    /// A message spoken by the local user.
    pub fn local(text: impl Into<String>) -> Self {
        Self {
            message: text.into(),
            from: MessageOrigin { is_local: true },
        }
    }

    pub fn text(&self) -> &str {
        &self.message
    }

    pub fn is_from_local_user(&self) -> bool {
        self.from.is_local
    }
}
