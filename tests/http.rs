//! HTTP surface integration tests.
//!
//! Starts an axum server over a temp-file store and exercises it with reqwest.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use itemstore::http::{self, AppState};
use itemstore::{FileStore, FileWatcher};

const FIXTURE: &str = r#"[
    {"id":1,"name":"Apple","price":10.0},
    {"id":2,"name":"Banana","price":20.0},
    {"id":3,"name":"Cherry","price":30.0}
]"#;

fn seeded_state() -> (AppState, PathBuf, TempDir) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("items.json");
    fs::write(&path, FIXTURE).unwrap();
    (AppState::new(FileStore::open(&path)), path, dir)
}

/// Bind to port 0 and return the actual address.
async fn start_server(state: AppState) -> String {
    let app = http::router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn list_with_limit_and_offset() {
    let (state, _path, _dir) = seeded_state();
    let base = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/items?limit=2&offset=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 3);
    let names: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Banana", "Cherry"]);
}

#[tokio::test]
async fn list_with_substring_filter() {
    let (state, _path, _dir) = seeded_state();
    let base = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/items?q=cher"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["name"], "Cherry");
}

#[tokio::test]
async fn list_with_junk_pagination_params() {
    let (state, _path, _dir) = seeded_state();
    let base = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/items?offset=-3&limit=nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 3);
    assert_eq!(body["items"].as_array().unwrap().len(), 3);

    // Negative limit is an empty page, still with the full count
    let resp = client
        .get(format!("{base}/items?limit=-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 3);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn etag_matches_yield_304() {
    let (state, _path, _dir) = seeded_state();
    let base = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/items")).send().await.unwrap();
    let etag = resp.headers()["etag"].to_str().unwrap().to_string();

    let resp = client
        .get(format!("{base}/items"))
        .header("if-none-match", &etag)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 304);
    assert!(resp.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn get_item_by_id() {
    let (state, _path, _dir) = seeded_state();
    let base = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/items/2")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "Banana");
    assert_eq!(body["price"], 20.0);
}

#[tokio::test]
async fn missing_item_returns_404() {
    let (state, _path, _dir) = seeded_state();
    let base = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/items/999"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn non_numeric_id_returns_404() {
    let (state, _path, _dir) = seeded_state();
    let base = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/items/banana"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn unmatched_path_returns_404() {
    let (state, _path, _dir) = seeded_state();
    let base = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/nonexistent"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "not found");
}

#[tokio::test]
async fn create_assigns_id_and_persists() {
    let (state, _path, _dir) = seeded_state();
    let base = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/items"))
        .json(&json!({ "name": "Dragonfruit", "price": 40.0, "category": "Fruit" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let created: serde_json::Value = resp.json().await.unwrap();
    let id = created["id"].as_u64().unwrap();
    assert!(id > 3);
    assert_eq!(created["name"], "Dragonfruit");
    assert_eq!(created["category"], "Fruit");

    // Round-trips through lookup by the assigned id
    let resp = client
        .get(format!("{base}/items/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let fetched: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(fetched, created);

    let resp = client.get(format!("{base}/items")).send().await.unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 4);
}

#[tokio::test]
async fn stats_matches_fixture() {
    let (state, _path, _dir) = seeded_state();
    let base = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/stats")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "total": 3, "averagePrice": 20.0 }));
}

#[tokio::test]
async fn stats_recomputed_after_create() {
    let (state, _path, _dir) = seeded_state();
    let base = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/stats")).send().await.unwrap();
    let before: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(before["total"], 3);

    let resp = client
        .post(format!("{base}/items"))
        .json(&json!({ "name": "Durian", "price": 40.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    // No settling delay: a completed append must be visible to the next read
    let resp = client.get(format!("{base}/stats")).send().await.unwrap();
    let after: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(after, json!({ "total": 4, "averagePrice": 25.0 }));
}

#[tokio::test]
async fn stats_recomputed_after_external_edit() {
    let (state, path, _dir) = seeded_state();
    let _watcher = FileWatcher::spawn(
        &path,
        Duration::from_millis(20),
        state.store.notifier().clone(),
    );
    let base = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/stats")).send().await.unwrap();
    let before: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(before["total"], 3);

    // Another process rewrites the backing file behind the server's back
    fs::write(&path, r#"[{"id":1,"name":"Apple","price":10.0}]"#).unwrap();

    // Allow a few poll intervals for detection
    tokio::time::sleep(Duration::from_millis(500)).await;

    let resp = client.get(format!("{base}/stats")).send().await.unwrap();
    let after: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(after, json!({ "total": 1, "averagePrice": 10.0 }));
}

#[tokio::test]
async fn empty_collection_stats_average_is_null() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("items.json");
    fs::write(&path, "[]").unwrap();
    let base = start_server(AppState::new(FileStore::open(&path))).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/stats")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["total"], 0);
    assert_eq!(body["averagePrice"], serde_json::Value::Null);
}

#[tokio::test]
async fn missing_store_file_yields_500_everywhere() {
    let dir = TempDir::new().unwrap();
    let state = AppState::new(FileStore::open(dir.path().join("nope.json")));
    let base = start_server(state).await;
    let client = reqwest::Client::new();

    for path in ["items", "items/1", "stats"] {
        let resp = client.get(format!("{base}/{path}")).send().await.unwrap();
        assert_eq!(resp.status(), 500, "GET /{path}");
        let body: serde_json::Value = resp.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("unavailable"));
    }

    let resp = client
        .post(format!("{base}/items"))
        .json(&json!({ "name": "Widget", "price": 1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
}

#[tokio::test]
async fn corrupt_store_file_yields_500() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("items.json");
    fs::write(&path, "{ not json").unwrap();
    let base = start_server(AppState::new(FileStore::open(&path))).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/items")).send().await.unwrap();
    assert_eq!(resp.status(), 500);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("corrupt"));
}
