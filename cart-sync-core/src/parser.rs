//! Chat Message Parser
//!
//! Classifies free-text agent messages into cart deltas using the sentence
//! templates the grocery agent speaks:
//!
//! | Kind    | Trigger (lowercased)                  | Template                                             |
//! |---------|---------------------------------------|------------------------------------------------------|
//! | Summary | `your cart:`                          | `<qty>x <name> (<unit>) - ₹<line total>` + `Total: ₹<amount>` |
//! | Added   | `added` and `to your cart`            | `Added <qty> <name> (<unit>) ... Price: ₹<unit price>` |
//! | Removed | `removed` and `from cart`             | `Removed <name> from cart`                           |
//! | Cleared | `cart cleared`                        | (no payload)                                         |
//!
//! Triggers are checked in that order and the first one wins. A message whose
//! trigger fires but whose template does not match produces no delta.
//!
//! The templates are an unversioned text protocol. [`MessageClassifier`] is the
//! seam where a structured event payload can replace them.

use crate::types::CartItem;
use regex::{Captures, Regex};
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use std::sync::LazyLock;

// =============================================================================
// TEMPLATE PATTERNS
// =============================================================================

/// `2x Basmati Rice (1kg) - ₹360`, price is the line total
static SUMMARY_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)x\s+(.+?)\s+\((.+?)\)\s+-\s+₹(\d+(?:\.\d+)?)").unwrap()
});

/// `Total: ₹392`
static SUMMARY_TOTAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Total:\s+₹(\d+(?:\.\d+)?)").unwrap());

/// `Added 2 Basmati Rice (1kg) to your cart. ... Price: ₹90 each.`
static ADDED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Added\s+(\d+)\s+(.+?)\s+\((.+?)\).*Price:\s+₹(\d+(?:\.\d+)?)").unwrap()
});

/// `Removed Fresh Paneer from cart`
static REMOVED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Removed\s+(.+?)\s+from cart").unwrap());

// =============================================================================
// DELTAS
// =============================================================================

/// A parsed cart mutation extracted from one chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartDelta {
    /// One item was added; `item.unit_price` is a per-unit price.
    Added { item: CartItem },
    /// The item whose name matches `name` was removed.
    Removed { name: String },
    /// Full cart listing. `total` is `None` when no `Total:` line was found.
    Summary {
        items: Vec<CartItem>,
        total: Option<Decimal>,
    },
    /// Cart emptied.
    Cleared,
}

/// Which template family a message belongs to, before payload extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaKind {
    Summary,
    Added,
    Removed,
    Cleared,
}

/// Turns one chat message into at most one delta.
///
/// Implementations must not panic on arbitrary input.
pub trait MessageClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Option<CartDelta>;
}

// =============================================================================
// TEMPLATE CLASSIFIER
// =============================================================================

/// Classifier for the English sentence templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateClassifier;

impl TemplateClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Pick the template family from trigger phrases only.
    pub fn kind_of(text: &str) -> Option<DeltaKind> {
        let lower = text.to_lowercase();
        if lower.contains("your cart:") {
            Some(DeltaKind::Summary)
        } else if lower.contains("added") && lower.contains("to your cart") {
            Some(DeltaKind::Added)
        } else if lower.contains("removed") && lower.contains("from cart") {
            Some(DeltaKind::Removed)
        } else if lower.contains("cart cleared") {
            Some(DeltaKind::Cleared)
        } else {
            None
        }
    }

    /// Parse a cart listing. Returns `None` when no item line matches.
    pub fn parse_summary(text: &str) -> Option<CartDelta> {
        let mut items = Vec::new();
        let mut total = None;

        for line in text.lines() {
            for caps in SUMMARY_ITEM_RE.captures_iter(line) {
                if let Some(item) = summary_item(&caps) {
                    items.push(item);
                }
            }
            if let Some(caps) = SUMMARY_TOTAL_RE.captures(line) {
                if let Some(amount) = amount(&caps, 1) {
                    total = Some(amount);
                }
            }
        }

        if items.is_empty() {
            tracing::debug!("cart summary had no item lines, ignoring");
            return None;
        }
        Some(CartDelta::Summary { items, total })
    }

    pub fn parse_added(text: &str) -> Option<CartDelta> {
        let caps = ADDED_RE.captures(text)?;
        let quantity = caps[1].parse::<u32>().ok()?;
        let unit_price = amount(&caps, 4)?;
        let item = CartItem::new(caps[2].trim(), quantity, unit_price, caps[3].trim());
        // The reducer adds this line total to the cart; refuse amounts it cannot hold.
        item.checked_line_total()?;
        Some(CartDelta::Added { item })
    }

    pub fn parse_removed(text: &str) -> Option<CartDelta> {
        let caps = REMOVED_RE.captures(text)?;
        let name = caps[1].trim();
        if name.is_empty() {
            return None;
        }
        Some(CartDelta::Removed {
            name: name.to_string(),
        })
    }
}

impl MessageClassifier for TemplateClassifier {
    fn classify(&self, text: &str) -> Option<CartDelta> {
        match Self::kind_of(text)? {
            DeltaKind::Summary => Self::parse_summary(text),
            DeltaKind::Added => Self::parse_added(text),
            DeltaKind::Removed => Self::parse_removed(text),
            DeltaKind::Cleared => Some(CartDelta::Cleared),
        }
    }
}

fn amount(caps: &Captures<'_>, group: usize) -> Option<Decimal> {
    Decimal::from_str(caps.get(group)?.as_str()).ok()
}

/// Summary lines carry the line total; derive the unit price from it.
fn summary_item(caps: &Captures<'_>) -> Option<CartItem> {
    let quantity = caps[1].parse::<u32>().ok()?;
    let line_total = amount(caps, 4)?;
    let unit_price = line_total.checked_div(Decimal::from(quantity))?;
    let item = CartItem::new(caps[2].trim(), quantity, unit_price, caps[3].trim());
    item.checked_line_total()?;
    Some(item)
}
