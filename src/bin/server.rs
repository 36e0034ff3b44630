//! Catalog server binary.
//!
//! Configuration comes from the environment:
//!
//! - `ITEMSTORE_ADDR` — listen address (default `127.0.0.1:3001`)
//! - `ITEMSTORE_DATA` — backing file path (default `data/items.json`)
//! - `ITEMSTORE_POLL_MS` — external-edit poll interval (default `500`)

use std::env;
use std::time::Duration;

use itemstore::http::{self, AppState};
use itemstore::{FileStore, FileWatcher};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let addr = env::var("ITEMSTORE_ADDR").unwrap_or_else(|_| "127.0.0.1:3001".to_string());
    let data = env::var("ITEMSTORE_DATA").unwrap_or_else(|_| "data/items.json".to_string());
    let poll_ms = env::var("ITEMSTORE_POLL_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(500);

    let state = AppState::new(FileStore::open(data.as_str()));
    let _watcher = FileWatcher::spawn(
        data.as_str(),
        Duration::from_millis(poll_ms),
        state.store.notifier().clone(),
    );

    tracing::info!(%addr, data = %data, poll_ms, "itemstore listening");
    if let Err(err) = http::serve(state, &addr).await {
        tracing::error!(error = %err, "server failed");
        std::process::exit(1);
    }
}
