//! Polling Client
//!
//! While a cart panel is open, a background task fetches the cart immediately
//! and then on a fixed interval, publishing every result through a
//! `tokio::sync::watch` channel.
//!
//! ```text
//!   Closed ──open()──▶ Open (task running: fetch now, then every tick)
//!     ▲                  │
//!     └────close()───────┘ (task stopped; dropping the handle aborts it)
//! ```
//!
//! There is no backoff and no retry: a failed fetch publishes the empty cart
//! and the next tick tries again.

use std::sync::Arc;
use std::time::Duration;

use cart_sync_core::CartDocument;
use chrono::{DateTime, Local};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::source::CartSource;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// What the panel renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelSnapshot {
    pub cart: CartDocument,
    /// Local time of the last successful fetch.
    pub last_update: Option<DateTime<Local>>,
    /// Incremented on every publish, success or failure.
    pub version: u64,
}

/// Receiver side of a panel's snapshots.
pub type PanelWatcher = watch::Receiver<PanelSnapshot>;

/// Starts polling tasks against one source.
#[derive(Clone)]
pub struct CartPoller {
    source: Arc<dyn CartSource>,
    interval: Duration,
}

impl CartPoller {
    pub fn new(source: Arc<dyn CartSource>) -> Self {
        Self::with_interval(source, DEFAULT_POLL_INTERVAL)
    }

    /// `interval` is clamped to at least 1ms.
    pub fn with_interval(source: Arc<dyn CartSource>, interval: Duration) -> Self {
        Self {
            source,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the polling task. Must be called inside a tokio runtime.
    pub fn start(&self) -> PollHandle {
        let (tx, rx) = watch::channel(PanelSnapshot::default());
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.source),
            self.interval,
            tx,
            stop_rx,
        ));

        PollHandle {
            stop: Some(stop_tx),
            task: Some(task),
            snapshots: rx,
        }
    }
}

async fn poll_loop(
    source: Arc<dyn CartSource>,
    every: Duration,
    tx: watch::Sender<PanelSnapshot>,
    mut stop: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        source = %source.describe(),
        interval_ms = every.as_millis() as u64,
        "cart panel opened, polling started"
    );

    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            _ = ticker.tick() => {
                tokio::select! {
                    biased;
                    _ = &mut stop => break,
                    _ = poll_once(source.as_ref(), &tx) => {}
                }
            }
        }
    }

    tracing::info!(source = %source.describe(), "cart panel closed, polling stopped");
}

async fn poll_once(source: &dyn CartSource, tx: &watch::Sender<PanelSnapshot>) {
    match source.fetch().await {
        Ok(cart) => {
            tracing::debug!(items = cart.items.len(), total = %cart.total, "cart fetched");
            tx.send_modify(|snap| {
                snap.cart = cart;
                snap.last_update = Some(Local::now());
                snap.version += 1;
            });
        }
        Err(e) => {
            tracing::warn!(error = %e, "cart fetch failed, showing empty cart");
            tx.send_modify(|snap| {
                snap.cart = CartDocument::empty();
                snap.version += 1;
            });
        }
    }
}

/// A running polling task. Dropping it aborts the task.
pub struct PollHandle {
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    snapshots: PanelWatcher,
}

impl PollHandle {
    pub fn subscribe(&self) -> PanelWatcher {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Signal the task and wait for it to exit.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::error!(error = ?e, "cart polling task panicked");
                }
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Display surface whose open/closed state scopes a polling task.
pub struct CartPanel {
    poller: CartPoller,
    handle: Option<PollHandle>,
}

impl CartPanel {
    pub fn new(poller: CartPoller) -> Self {
        Self {
            poller,
            handle: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Open the panel and start polling. Opening an open panel keeps the
    /// running task.
    pub fn open(&mut self) -> PanelWatcher {
        self.handle
            .get_or_insert_with(|| self.poller.start())
            .subscribe()
    }

    /// Close the panel and stop polling. No-op when already closed.
    pub async fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop().await;
        }
    }

    /// Current snapshot, `None` while closed.
    pub fn snapshot(&self) -> Option<PanelSnapshot> {
        self.handle.as_ref().map(PollHandle::snapshot)
    }
}
