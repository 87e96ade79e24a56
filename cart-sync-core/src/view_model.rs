//! Cart View Model
//!
//! In-memory reducer that folds [`CartDelta`]s into a [`Cart`] for rendering.
//!
//! The view model is driven by the chat transcript: every time the transcript
//! changes, [`CartViewModel::sync`] re-scans the trailing window of messages in
//! order. Summary and Cleared are idempotent under that re-scan. Added and
//! Removed are not: a replayed Added replaces the item but adds its amount to
//! the total again, and a replayed Removed can take out a different item that
//! happens to share the name.

use crate::parser::{CartDelta, MessageClassifier, TemplateClassifier};
use crate::types::{Cart, CartItem, ChatMessage};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Number of trailing transcript messages re-scanned on every sync.
pub const DEFAULT_SCAN_WINDOW: usize = 10;

/// How an Added delta for an existing name affects the running total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddedTotalPolicy {
    /// Always add `qty * price`, even when the entry was replaced.
    #[default]
    Accumulate,
    /// Subtract the replaced entry before adding the new one.
    NetOfReplaced,
}

#[derive(Debug, Clone)]
pub struct ViewModelConfig {
    /// Trailing messages re-scanned per sync.
    pub window: usize,
    pub added_total_policy: AddedTotalPolicy,
    /// Skip messages spoken by the local user.
    pub ignore_local: bool,
}

impl Default for ViewModelConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_SCAN_WINDOW,
            added_total_policy: AddedTotalPolicy::Accumulate,
            ignore_local: false,
        }
    }
}

/// Owns the chat-derived cart for one display session.
pub struct CartViewModel {
    cart: Cart,
    classifier: Arc<dyn MessageClassifier>,
    config: ViewModelConfig,
}

impl Default for CartViewModel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CartViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartViewModel")
            .field("cart", &self.cart)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl CartViewModel {
    /// Empty cart, English template classifier, default config.
    pub fn new() -> Self {
        Self::with_config(ViewModelConfig::default())
    }

    pub fn with_config(config: ViewModelConfig) -> Self {
        Self::with_classifier(Arc::new(TemplateClassifier), config)
    }

    pub fn with_classifier(classifier: Arc<dyn MessageClassifier>, config: ViewModelConfig) -> Self {
        Self {
            cart: Cart::empty(),
            classifier,
            config,
        }
    }

    /// Current cart snapshot.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn config(&self) -> &ViewModelConfig {
        &self.config
    }

    /// Re-scan the trailing window of `messages` and apply every delta found.
    ///
    /// Returns the number of deltas applied.
    pub fn sync(&mut self, messages: &[ChatMessage]) -> usize {
        let start = messages.len().saturating_sub(self.config.window);
        let mut applied = 0;

        for msg in &messages[start..] {
            if msg.text().is_empty() {
                continue;
            }
            if self.config.ignore_local && msg.is_from_local_user() {
                continue;
            }
            if let Some(delta) = self.classifier.classify(msg.text()) {
                self.apply(delta);
                applied += 1;
            }
        }

        if applied > 0 {
            tracing::debug!(
                applied,
                items = self.cart.items.len(),
                total = %self.cart.total,
                "cart view model synced"
            );
        }
        applied
    }

    /// Classify and apply a single message.
    pub fn apply_text(&mut self, text: &str) -> bool {
        match self.classifier.classify(text) {
            Some(delta) => {
                self.apply(delta);
                true
            }
            None => false,
        }
    }

    /// Fold one delta into the cart.
    pub fn apply(&mut self, delta: CartDelta) {
        match delta {
            CartDelta::Summary { items, total } => {
                self.cart.items = items;
                // No `Total:` line reads as zero.
                self.cart.total = total.unwrap_or(Decimal::ZERO);
            }
            CartDelta::Added { item } => self.apply_added(item),
            CartDelta::Removed { name } => self.apply_removed(&name),
            CartDelta::Cleared => {
                self.cart.items.clear();
                self.cart.total = Decimal::ZERO;
            }
        }
    }

    fn apply_added(&mut self, item: CartItem) {
        let existing = self.cart.items.iter().position(|i| i.name == item.name);

        let mut total = Some(self.cart.total);
        if let (Some(idx), AddedTotalPolicy::NetOfReplaced) =
            (existing, self.config.added_total_policy)
        {
            let replaced = self.cart.items[idx].checked_line_total();
            total = total.zip(replaced).and_then(|(t, r)| t.checked_sub(r));
        }
        let total = total
            .zip(item.checked_line_total())
            .and_then(|(t, added)| t.checked_add(added));

        let Some(total) = total else {
            tracing::warn!(item = %item.name, "cart total would overflow, ignoring added item");
            return;
        };
        match existing {
            Some(idx) => self.cart.items[idx] = item,
            None => self.cart.items.push(item),
        }
        self.cart.total = total;
    }

    fn apply_removed(&mut self, name: &str) {
        let found = self
            .cart
            .items
            .iter()
            .position(|i| i.name.contains(name) || name.contains(i.name.as_str()));

        match found {
            Some(idx) => {
                let total = self.cart.items[idx]
                    .checked_line_total()
                    .and_then(|line| self.cart.total.checked_sub(line));
                match total {
                    Some(total) => {
                        self.cart.items.remove(idx);
                        self.cart.total = total;
                    }
                    None => tracing::warn!(name, "cart total would overflow, ignoring removal"),
                }
            }
            None => tracing::debug!(name, "removal target not in cart"),
        }
    }

    /// Drop all state, as on a new display session.
    pub fn reset(&mut self) {
        self.cart = Cart::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rice(qty: u32) -> CartItem {
        CartItem::new("Basmati Rice", qty, dec("90"), "1kg")
    }

    const ADD_RICE: &str = "Added 2 Basmati Rice (1kg) to your cart. Total now: 2. Price: ₹90 each.";
    const SUMMARY: &str =
        "Your cart: 2x Basmati Rice (1kg) - ₹360, 1x Milk (500ml) - ₹32\n\nTotal: ₹392";

    #[test]
    fn summary_replaces_cart() {
        let mut vm = CartViewModel::new();
        vm.apply_text(ADD_RICE);
        assert!(vm.apply_text(SUMMARY));

        let cart = vm.cart();
        assert_eq!(
            cart.items,
            vec![
                CartItem::new("Basmati Rice", 2, dec("180"), "1kg"),
                CartItem::new("Milk", 1, dec("32"), "500ml"),
            ]
        );
        assert_eq!(cart.total, dec("392"));
    }

    #[test]
    fn summary_without_total_line_has_zero_total() {
        let mut vm = CartViewModel::new();
        vm.apply_text(ADD_RICE);
        vm.apply_text("Your cart: 2x Basmati Rice (1kg) - ₹360");
        assert_eq!(vm.cart().items, vec![rice(2)]);
        assert_eq!(vm.cart().total, Decimal::ZERO);
    }

    #[test]
    fn overflowing_price_leaves_cart_unchanged() {
        let mut vm = CartViewModel::new();
        vm.apply_text(SUMMARY);
        let before = vm.cart().clone();

        assert!(!vm.apply_text(
            "Added 2 Rice (1kg) to your cart. Price: ₹79228162514264337593543950335 each."
        ));
        assert_eq!(vm.cart(), &before);
    }

    #[test]
    fn replayed_added_stops_at_total_overflow() {
        let add = "Added 1 Rice (1kg) to your cart. Price: ₹39614081257132168796771975167 each.";
        let mut vm = CartViewModel::new();
        vm.apply_text(add);
        vm.apply_text(add);
        let saturated = vm.cart().clone();
        assert_eq!(saturated.total, Decimal::MAX - Decimal::ONE);

        // A third re-add would overflow; it applies as a no-op.
        assert!(vm.apply_text(add));
        assert_eq!(vm.cart(), &saturated);
    }

    #[test]
    fn removal_that_would_overflow_is_ignored() {
        let mut vm = CartViewModel::new();
        vm.apply(CartDelta::Summary {
            items: vec![CartItem::new("Rice", 1, Decimal::MAX, "1kg")],
            total: Some(Decimal::MIN),
        });
        let before = vm.cart().clone();
        vm.apply_text("Removed Rice from cart");
        assert_eq!(vm.cart(), &before);
    }

    #[test]
    fn summary_with_huge_quantities_counts_without_wrapping() {
        let mut vm = CartViewModel::new();
        assert!(vm.apply_text(
            "Your cart: 4294967295x A (1kg) - ₹1\n4294967295x B (1kg) - ₹1\nTotal: ₹2"
        ));
        assert_eq!(vm.cart().items.len(), 2);
        assert_eq!(vm.cart().item_count(), 2 * u64::from(u32::MAX));
        assert_eq!(vm.cart().total, dec("2"));
    }

    #[test]
    fn unmatched_summary_keeps_state() {
        let mut vm = CartViewModel::new();
        vm.apply_text(ADD_RICE);
        let before = vm.cart().clone();
        assert!(!vm.apply_text("Your cart: is empty"));
        assert_eq!(vm.cart(), &before);
    }

    #[test]
    fn cleared_always_empties() {
        let mut vm = CartViewModel::new();
        vm.apply_text(SUMMARY);
        vm.apply_text(ADD_RICE);
        vm.apply_text("Cart cleared");
        assert!(vm.cart().is_empty());
        assert_eq!(vm.cart().total, Decimal::ZERO);

        vm.apply(CartDelta::Cleared);
        assert!(vm.cart().is_empty());
    }

    #[test]
    fn added_appends_new_item() {
        let mut vm = CartViewModel::new();
        vm.apply_text(SUMMARY);
        vm.apply_text("Added 1 Fresh Paneer (200g) to your cart. Price: ₹90 each.");

        let cart = vm.cart();
        assert_eq!(cart.items.len(), 3);
        assert_eq!(cart.items[2].name, "Fresh Paneer");
        assert_eq!(cart.total, dec("482"));
    }

    #[test]
    fn added_scenario_from_agent() {
        let mut vm = CartViewModel::new();
        vm.apply_text(ADD_RICE);
        assert_eq!(vm.cart().items, vec![rice(2)]);
        assert_eq!(vm.cart().total, dec("180"));
    }

    /// Replacing an existing name keeps the item count but adds the new
    /// amount on top of the old one. The total drifts from the line totals.
    #[test]
    fn added_replace_double_counts_total() {
        let mut vm = CartViewModel::new();
        vm.apply_text(ADD_RICE);
        vm.apply_text("Added 3 Basmati Rice (1kg) to your cart. Price: ₹90 each.");

        let cart = vm.cart();
        assert_eq!(cart.items, vec![rice(3)]);
        assert_eq!(cart.total, dec("450"));
        assert_eq!(cart.computed_total(), dec("270"));
    }

    #[test]
    fn added_replace_net_policy() {
        let mut vm = CartViewModel::with_config(ViewModelConfig {
            added_total_policy: AddedTotalPolicy::NetOfReplaced,
            ..Default::default()
        });
        vm.apply_text(ADD_RICE);
        vm.apply_text("Added 3 Basmati Rice (1kg) to your cart. Price: ₹90 each.");
        assert_eq!(vm.cart().total, dec("270"));
    }

    #[test]
    fn removed_by_substring() {
        let mut vm = CartViewModel::new();
        vm.apply(CartDelta::Added {
            item: CartItem::new("Fresh Paneer (200g)", 1, dec("90"), "200g"),
        });
        vm.apply_text(ADD_RICE);

        vm.apply_text("Removed Fresh Paneer from cart");
        assert_eq!(vm.cart().items, vec![rice(2)]);
        assert_eq!(vm.cart().total, dec("180"));
    }

    #[test]
    fn removed_matches_shorter_stored_name() {
        let mut vm = CartViewModel::new();
        vm.apply_text(SUMMARY);
        vm.apply_text("Removed Milk 500ml pouch from cart");
        assert_eq!(vm.cart().items.len(), 1);
        assert_eq!(vm.cart().total, dec("360"));
    }

    #[test]
    fn removed_first_match_wins() {
        let mut vm = CartViewModel::new();
        vm.apply(CartDelta::Summary {
            items: vec![
                CartItem::new("Amul Milk", 1, dec("32"), "500ml"),
                CartItem::new("Amul Milk Gold", 1, dec("36"), "500ml"),
            ],
            total: Some(dec("68")),
        });
        vm.apply_text("Removed Milk from cart");
        assert_eq!(vm.cart().items.len(), 1);
        assert_eq!(vm.cart().items[0].name, "Amul Milk Gold");
        assert_eq!(vm.cart().total, dec("36"));
    }

    #[test]
    fn removed_absent_is_noop() {
        let mut vm = CartViewModel::new();
        vm.apply_text(SUMMARY);
        let before = vm.cart().clone();
        vm.apply_text("Removed Ghee from cart");
        assert_eq!(vm.cart(), &before);
    }

    #[test]
    fn removal_matching_is_case_sensitive() {
        let mut vm = CartViewModel::new();
        vm.apply_text(SUMMARY);
        vm.apply_text("Removed milk from cart");
        assert_eq!(vm.cart().items.len(), 2);
    }

    #[test]
    fn sync_only_scans_trailing_window() {
        let mut messages = vec![ChatMessage::agent(ADD_RICE)];
        for i in 0..DEFAULT_SCAN_WINDOW {
            messages.push(ChatMessage::agent(format!("filler {i}")));
        }
        let mut vm = CartViewModel::new();
        assert_eq!(vm.sync(&messages), 0);
        assert!(vm.cart().is_empty());
    }

    #[test]
    fn sync_rescan_is_idempotent_for_summary_and_cleared() {
        let messages = vec![
            ChatMessage::agent(ADD_RICE),
            ChatMessage::agent("Cart cleared"),
            ChatMessage::agent(SUMMARY),
        ];
        let mut vm = CartViewModel::new();
        vm.sync(&messages);
        let first = vm.cart().clone();
        vm.sync(&messages);
        assert_eq!(vm.cart(), &first);
        assert_eq!(first.total, dec("392"));
    }

    /// Re-scanning a trailing Added message grows the total on every sync.
    #[test]
    fn sync_rescan_replays_added() {
        let messages = vec![ChatMessage::agent(ADD_RICE)];
        let mut vm = CartViewModel::new();
        vm.sync(&messages);
        vm.sync(&messages);
        assert_eq!(vm.cart().items, vec![rice(2)]);
        assert_eq!(vm.cart().total, dec("360"));
    }

    #[test]
    fn local_messages_can_be_ignored() {
        let messages = vec![ChatMessage::agent(SUMMARY), ChatMessage::local("cart cleared")];

        let mut vm = CartViewModel::new();
        vm.sync(&messages);
        assert!(vm.cart().is_empty());

        let mut vm = CartViewModel::with_config(ViewModelConfig {
            ignore_local: true,
            ..Default::default()
        });
        vm.sync(&messages);
        assert_eq!(vm.cart().items.len(), 2);
    }

    struct Scripted;

    impl MessageClassifier for Scripted {
        fn classify(&self, text: &str) -> Option<CartDelta> {
            (text == "CLEAR").then_some(CartDelta::Cleared)
        }
    }

    #[test]
    fn classifier_is_pluggable() {
        let mut vm = CartViewModel::with_classifier(Arc::new(Scripted), ViewModelConfig::default());
        vm.apply(CartDelta::Added { item: rice(1) });
        assert!(!vm.apply_text(SUMMARY));
        assert!(vm.apply_text("CLEAR"));
        assert!(vm.cart().is_empty());
    }
}
