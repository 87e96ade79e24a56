//! Cart Sync Core
//!
//! Chat-driven cart state for the grocery voice agent:
//!
//! - [`parser`] turns agent chat lines into [`parser::CartDelta`]s
//! - [`view_model`] folds deltas into the cart shown next to the transcript
//! - [`store`] persists the agent's cart as one JSON document
//! - [`ledger`] is the agent-side cart that writes that document
//!
//! The chat-derived view model and the file-backed store are independent
//! sources of truth. Nothing here reconciles them.

pub mod error;
pub mod ledger;
pub mod money;
pub mod parser;
pub mod store;
pub mod templates;
pub mod types;
pub mod view_model;

pub use rust_decimal;

pub use error::{CartError, Result};
pub use ledger::{CartLedger, LedgerReply};
pub use parser::{CartDelta, DeltaKind, MessageClassifier, TemplateClassifier};
pub use store::{CartStore, FileCartStore, DEFAULT_CART_PATH};
pub use types::{Cart, CartDocument, CartItem, ChatMessage, MessageOrigin};
pub use view_model::{AddedTotalPolicy, CartViewModel, ViewModelConfig, DEFAULT_SCAN_WINDOW};
