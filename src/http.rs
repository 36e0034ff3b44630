//! HTTP surface over the store, query engine and stats cache.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /items` — filtered, paginated listing: `{ "items": [...], "total": n }`.
//! - `GET /items/:id` — single record, 404 if absent.
//! - `POST /items` — create, 201 with the stored record.
//! - `GET /stats` — cached `{ "total": n, "averagePrice": x }`.
//! - anything else — 404 `{ "error": "not found" }`.
//!
//! ## Example
//!
//! ```ignore
//! use itemstore::http::{self, AppState};
//! use itemstore::FileStore;
//!
//! let state = AppState::new(FileStore::open("data/items.json"));
//!
//! // Get the router to compose with other axum routes
//! let app = http::router(state.clone());
//!
//! // Or serve directly
//! http::serve(state, "0.0.0.0:3001").await?;
//! ```

use std::fmt;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::error::StoreError;
use crate::query::{self, QueryParams, QueryResult};
use crate::record::{NewRecord, Record};
use crate::stats::{Stats, StatsCache};
use crate::store::FileStore;

/// Shared handler state: the store and a stats cache already subscribed to
/// the store's change notifier.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FileStore>,
    pub stats: StatsCache,
}

impl AppState {
    pub fn new(store: FileStore) -> Self {
        let stats = StatsCache::new();
        stats.subscribe(store.notifier());
        Self {
            store: Arc::new(store),
            stats,
        }
    }
}

/// Build an axum `Router` over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/:id", get(get_item))
        .route("/stats", get(get_stats))
        .fallback(not_found)
        .with_state(state)
}

/// Serve the catalog over HTTP at the given address (e.g. `"0.0.0.0:3001"`).
pub async fn serve(state: AppState, addr: &str) -> Result<(), std::io::Error> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

/// Error type for request handlers, mapped to a status code on the way out.
#[derive(Debug)]
pub enum ApiError {
    /// No record with the requested id. User-facing, non-fatal.
    NotFound(String),
    /// Store failure — unreadable or corrupt backing file.
    Store(StoreError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(id) => write!(f, "item {} not found", id),
            ApiError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Store(e) => Some(e),
            ApiError::NotFound(_) => None,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Store(e) = &self {
            tracing::error!(error = %e, "store failure");
        }
        let body = json!({ "error": self.to_string() });
        (self.status_code(), Json(body)).into_response()
    }
}

/// Raw query parameters for `GET /items`, parsed leniently: a negative or
/// non-numeric `offset` means 0, a non-numeric `limit` means unlimited, and
/// a negative `limit` clamps to 0 (an empty page).
#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    q: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
}

impl ListQuery {
    fn into_params(self) -> QueryParams {
        QueryParams {
            q: self.q,
            offset: self
                .offset
                .and_then(|s| s.parse::<i64>().ok())
                .map_or(0, |n| n.max(0) as usize),
            limit: self
                .limit
                .and_then(|s| s.parse::<i64>().ok())
                .map(|n| n.max(0) as usize),
        }
    }
}

/// `GET /items` — filter, count, paginate. Sets an `ETag` from the collection
/// fingerprint; a matching `If-None-Match` short-circuits to 304.
async fn list_items(
    State(state): State<AppState>,
    Query(list): Query<ListQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let collection = state.store.load_all()?;
    let etag = format!("\"{}\"", collection.fingerprint());

    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());
    if if_none_match == Some(etag.as_str()) {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let result: QueryResult = query::query(&collection.records, &list.into_params());
    Ok(([(header::ETAG, etag)], Json(result)).into_response())
}

/// `GET /items/:id` — a non-numeric id simply misses, never a type error.
async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    let collection = state.store.load_all()?;
    let parsed: u64 = id.parse().map_err(|_| ApiError::NotFound(id.clone()))?;
    query::find_by_id(&collection.records, parsed)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

/// `POST /items` — append and return the stored record with its assigned id.
async fn create_item(
    State(state): State<AppState>,
    Json(new): Json<NewRecord>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let record = state.store.append(new)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /stats` — served from cache when valid.
async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>, ApiError> {
    let stats = state.stats.get_or_compute(&state.store)?;
    Ok(Json(stats))
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response()
}
