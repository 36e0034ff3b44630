//! Deterministic filtering and pagination over an in-memory collection
//! snapshot. No sorting — page order follows stored order.

use serde::Serialize;

use crate::record::Record;

/// Parameters for a list query. `offset` has already been clamped to the
/// non-negative range by the caller; `limit = None` extends the page to the
/// end of the filtered set.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pub q: Option<String>,
    pub offset: usize,
    pub limit: Option<usize>,
}

/// One page of matches plus the total match count before pagination.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub items: Vec<Record>,
    pub total: usize,
}

/// Filter by case-insensitive substring on `name`, then slice the page
/// `[offset, offset+limit)` clipped to the filtered set. An out-of-range
/// offset yields an empty page with the correct `total`.
pub fn query(records: &[Record], params: &QueryParams) -> QueryResult {
    let needle = params
        .q
        .as_deref()
        .filter(|q| !q.is_empty())
        .map(|q| q.to_lowercase());

    let matches: Vec<&Record> = match &needle {
        Some(needle) => records
            .iter()
            .filter(|r| r.name.to_lowercase().contains(needle))
            .collect(),
        None => records.iter().collect(),
    };

    let total = matches.len();
    let start = params.offset.min(total);
    let end = match params.limit {
        Some(limit) => start.saturating_add(limit).min(total),
        None => total,
    };

    QueryResult {
        items: matches[start..end].iter().map(|r| (*r).clone()).collect(),
        total,
    }
}

/// First record with a matching id, in stored order.
pub fn find_by_id(records: &[Record], id: u64) -> Option<&Record> {
    records.iter().find(|r| r.id == id)
}
