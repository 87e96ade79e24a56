//! Replay a saved chat transcript through the cart view model.

use anyhow::{Context, Result};
use cart_sync_core::{Cart, CartViewModel, ChatMessage, ViewModelConfig};

/// How messages are fed to the view model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayMode {
    /// Sync after every appended message, re-scanning the trailing window
    /// each time, the way a live transcript drives the view model.
    #[default]
    Live,
    /// Apply every message exactly once, in order.
    Once,
}

/// Parse a transcript: a JSON array of feed records, or one record per line.
pub fn load_transcript(raw: &str) -> Result<Vec<ChatMessage>> {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).context("invalid transcript JSON array");
    }

    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<ChatMessage>(line)
                .with_context(|| format!("invalid transcript record on line {}", idx + 1))
        })
        .collect()
}

pub fn replay(messages: &[ChatMessage], config: ViewModelConfig, mode: ReplayMode) -> Cart {
    let mut vm = CartViewModel::with_config(config);
    match mode {
        ReplayMode::Live => {
            for end in 1..=messages.len() {
                vm.sync(&messages[..end]);
            }
        }
        ReplayMode::Once => {
            for msg in messages {
                if vm.config().ignore_local && msg.is_from_local_user() {
                    continue;
                }
                vm.apply_text(msg.text());
            }
        }
    }
    tracing::debug!(messages = messages.len(), ?mode, "transcript replayed");
    vm.cart().clone()
}
