//! Plain-text rendering of carts for the terminal.

use std::fmt::Write;

use cart_sync_core::money;
use cart_sync_core::CartDocument;

use crate::poller::PanelSnapshot;

pub fn render_cart(cart: &CartDocument) -> String {
    let mut out = String::new();
    let noun = if cart.item_count == 1 { "item" } else { "items" };
    let _ = writeln!(out, "Cart ({} {})", cart.item_count, noun);

    if cart.items.is_empty() {
        out.push_str("  Your cart is empty\n");
        out.push_str("  Start adding items by talking to the agent\n");
        return out;
    }

    for item in &cart.items {
        let meta = match item.brand.as_deref() {
            Some(brand) => format!("{brand} • {}", item.unit),
            None => item.unit.clone(),
        };
        let _ = writeln!(
            out,
            "  {} ({})  ×{}  ₹{}",
            item.name,
            meta,
            item.quantity,
            money::display(item.line_total())
        );
    }
    let _ = writeln!(out, "Total ₹{}", money::display(cart.total));
    out.push_str("Say \"place my order\" to complete checkout\n");
    out
}

pub fn render_panel(snapshot: &PanelSnapshot) -> String {
    let mut out = render_cart(&snapshot.cart);
    if let Some(at) = snapshot.last_update {
        let _ = writeln!(out, "Last updated: {}", at.format("%H:%M:%S"));
    }
    out
}
