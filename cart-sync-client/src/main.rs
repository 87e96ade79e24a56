//! cart-sync: terminal cart panel and transcript replay.
//!
//! ```bash
//! cart-sync watch --base-url http://127.0.0.1:3000
//! cart-sync replay transcript.jsonl --mode once
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use cart_sync_client::render::{render_cart, render_panel};
use cart_sync_client::replay::{load_transcript, replay, ReplayMode};
use cart_sync_client::{CartPanel, CartPoller, HttpCartSource};
use cart_sync_core::{AddedTotalPolicy, CartDocument, ViewModelConfig, DEFAULT_SCAN_WINDOW};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "cart-sync", about = "Cart panel and chat transcript tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open a cart panel against a running cart API and print every update
    Watch {
        #[arg(long, env = "CART_SYNC_BASE_URL", default_value = "http://127.0.0.1:3000")]
        base_url: String,

        #[arg(
            long,
            env = "CART_SYNC_POLL_INTERVAL_MS",
            default_value_t = 1000,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        interval_ms: u64,
    },

    /// Replay a chat transcript (JSON array or JSON lines) through the view model
    Replay {
        /// Transcript file, `-` for stdin
        path: PathBuf,

        #[arg(long, value_enum, default_value_t = ModeArg::Live)]
        mode: ModeArg,

        #[arg(long, default_value_t = DEFAULT_SCAN_WINDOW)]
        window: usize,

        /// Subtract the replaced entry when an Added message repeats a name
        #[arg(long)]
        net_replaced: bool,

        /// Skip messages spoken by the local user
        #[arg(long)]
        ignore_local: bool,

        /// Print the cart as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Live,
    Once,
}

impl From<ModeArg> for ReplayMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Live => ReplayMode::Live,
            ModeArg::Once => ReplayMode::Once,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,cart_sync_client=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Watch {
            base_url,
            interval_ms,
        } => watch(&base_url, Duration::from_millis(interval_ms)).await,
        Command::Replay {
            path,
            mode,
            window,
            net_replaced,
            ignore_local,
            json,
        } => {
            let config = ViewModelConfig {
                window,
                added_total_policy: if net_replaced {
                    AddedTotalPolicy::NetOfReplaced
                } else {
                    AddedTotalPolicy::Accumulate
                },
                ignore_local,
            };
            replay_file(&path, config, mode.into(), json)
        }
    }
}

async fn watch(base_url: &str, interval: Duration) -> Result<()> {
    let source = Arc::new(HttpCartSource::new(base_url));
    let mut panel = CartPanel::new(CartPoller::with_interval(source, interval));
    let mut rx = panel.open();
    let mut last_shown: Option<CartDocument> = None;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                if last_shown.as_ref() != Some(&snapshot.cart) {
                    println!("{}", render_panel(&snapshot));
                    last_shown = Some(snapshot.cart);
                }
            }
        }
    }

    panel.close().await;
    Ok(())
}

fn replay_file(path: &Path, config: ViewModelConfig, mode: ReplayMode, json: bool) -> Result<()> {
    let raw = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
    };
    let messages = load_transcript(&raw)?;
    let cart = replay(&messages, config, mode);

    if cart.total != cart.computed_total() {
        tracing::warn!(
            running_total = %cart.total,
            line_totals = %cart.computed_total(),
            "view model total drifted from line totals"
        );
    }

    let doc = CartDocument::from(&cart);
    if json {
        println!("{}", doc.to_pretty_json()?);
    } else {
        print!("{}", render_cart(&doc));
    }
    Ok(())
}
