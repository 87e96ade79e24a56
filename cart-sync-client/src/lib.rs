//! cart-sync-client: display-side consumers of the cart.
//!
//! - [`poller`] keeps an open [`poller::CartPanel`] in step with the cart API
//! - [`replay`] runs a saved chat transcript through the view model
//! - [`render`] formats carts for the terminal

pub mod poller;
pub mod render;
pub mod replay;
pub mod source;

pub use poller::{CartPanel, CartPoller, PanelSnapshot, PanelWatcher, PollHandle, DEFAULT_POLL_INTERVAL};
pub use source::{CartSource, HttpCartSource, CART_ENDPOINT};
