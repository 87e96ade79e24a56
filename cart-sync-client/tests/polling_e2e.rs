//! End-to-end: agent ledger → cart file → cart API → polling panel.
//!
//! Run with: cargo test -p cart-sync-client --test polling_e2e

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::RawQuery;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;
use cart_sync_client::{
    CartPanel, CartPoller, CartSource, HttpCartSource, PanelSnapshot, PanelWatcher,
};
use cart_sync_core::rust_decimal::Decimal;
use cart_sync_core::{CartError, CartItem, CartLedger, FileCartStore};
use cart_sync_server::build_router;
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Wait until the panel shows a cart satisfying `pred`.
async fn wait_for(rx: &mut PanelWatcher, pred: impl Fn(&PanelSnapshot) -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if pred(&*rx.borrow_and_update()) {
                return;
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("panel never reached the expected cart");
}

#[tokio::test]
async fn panel_follows_agent_writes() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileCartStore::new(
        dir.path().join("orders").join("current_cart.json"),
    ));
    let base_url = serve(build_router(store.clone())).await;

    let source = Arc::new(HttpCartSource::new(&base_url));
    let mut panel = CartPanel::new(CartPoller::with_interval(
        source,
        Duration::from_millis(50),
    ));
    let mut rx = panel.open();

    wait_for(&mut rx, |s| s.last_update.is_some() && s.cart.is_empty()).await;
    assert!(store.path().exists());

    let mut ledger = CartLedger::new();
    ledger.add(
        CartItem::new("Basmati Rice", 1, 90.into(), "1kg").with_id("grains_001"),
        2,
    );
    ledger.persist(store.as_ref()).await.unwrap();

    wait_for(&mut rx, |s| s.cart.item_count == 2).await;
    let snap = panel.snapshot().unwrap();
    assert_eq!(snap.cart.items[0].name, "Basmati Rice");
    assert_eq!(snap.cart.total, Decimal::from(180));

    ledger.clear();
    ledger.persist(store.as_ref()).await.unwrap();
    wait_for(&mut rx, |s| s.cart.item_count == 0).await;

    panel.close().await;
    assert!(!panel.is_open());
}

#[tokio::test]
async fn requests_bust_caches() {
    let seen: Arc<Mutex<Vec<(HeaderMap, Option<String>)>>> = Arc::default();
    let record = Arc::clone(&seen);
    let app = Router::new().route(
        "/api/cart/current",
        get(move |headers: HeaderMap, RawQuery(query): RawQuery| {
            let record = Arc::clone(&record);
            async move {
                record.lock().unwrap().push((headers, query));
                axum::Json(serde_json::json!({ "items": [], "total": 0, "item_count": 0 }))
            }
        }),
    );
    let base_url = serve(app).await;

    let source = HttpCartSource::new(&base_url);
    source.fetch().await.unwrap();

    let seen = seen.lock().unwrap();
    let (headers, query) = &seen[0];
    assert_eq!(headers["cache-control"], "no-cache");
    assert_eq!(headers["pragma"], "no-cache");
    let query = query.as_deref().unwrap_or_default();
    assert!(query.starts_with("t="), "query was {query:?}");
    assert!(query[2..].parse::<i64>().is_ok());
}

#[tokio::test]
async fn error_status_is_reported() {
    let app = Router::new().route(
        "/api/cart/current",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base_url = serve(app).await;

    let err = HttpCartSource::new(&base_url).fetch().await.unwrap_err();
    assert!(matches!(err, CartError::Status(500)));
}

#[tokio::test]
async fn unreachable_server_shows_empty_cart() {
    // Bind then drop to get a port nobody listens on.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let source = Arc::new(HttpCartSource::new(&format!("http://{addr}")));
    let err = source.fetch().await.unwrap_err();
    assert!(matches!(err, CartError::Http(_)));

    let handle = CartPoller::with_interval(source, Duration::from_millis(20)).start();
    let mut rx = handle.subscribe();
    rx.changed().await.unwrap();
    let snap = rx.borrow().clone();
    assert!(snap.cart.is_empty());
    assert!(snap.last_update.is_none());
    assert!(snap.version >= 1);
    handle.stop().await;
}
