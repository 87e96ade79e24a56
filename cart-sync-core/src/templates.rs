//! Agent-side sentence templates.
//!
//! These are the lines the grocery agent speaks after each cart tool call.
//! They are the producer side of the templates recognised by
//! [`crate::parser::TemplateClassifier`].

use crate::money;
use crate::types::CartItem;
use rust_decimal::Decimal;
use std::fmt::Write;

/// `Added 2 Basmati Rice (1kg) to your cart. Total now: 2. Price: ₹90 each.`
///
/// `in_cart` is the quantity of this item in the cart after the add.
pub fn added(item: &CartItem, added_qty: u32, in_cart: u32) -> String {
    format!(
        "Added {} {} ({}) to your cart. Total now: {}. Price: ₹{} each.",
        added_qty,
        item.name,
        item.unit,
        in_cart,
        money::display(item.unit_price)
    )
}

/// `Removed Fresh Paneer from cart`
pub fn removed(name: &str) -> String {
    format!("Removed {name} from cart")
}

pub fn updated(name: &str, quantity: u32) -> String {
    format!("Updated {name} quantity to {quantity}")
}

pub fn not_in_cart(name: &str) -> String {
    format!("{name} is not in your cart")
}

pub fn cleared() -> String {
    "Cart cleared".to_string()
}

/// Multi-line cart listing with a trailing `Total:` line.
///
/// An empty cart renders as `Your cart is empty`, which carries no
/// `your cart:` trigger.
pub fn summary(items: &[CartItem]) -> String {
    if items.is_empty() {
        return "Your cart is empty".to_string();
    }

    let mut out = String::from("Your cart:");
    let mut total = Decimal::ZERO;
    for item in items {
        let line = item.line_total();
        total = total.saturating_add(line);
        let _ = write!(
            out,
            "\n- {}x {} ({}) - ₹{}",
            item.quantity,
            item.name,
            item.unit,
            money::display(line)
        );
    }
    let _ = write!(out, "\n\nTotal: ₹{}", money::display(total));
    out
}
