//! Memoized aggregate statistics over the record collection.
//!
//! The cache exists purely to avoid re-scanning the whole collection on every
//! stats read. Correctness hinges on invalidation: any detected mutation of
//! the backing file — the store's own writes or an external edit — drops the
//! memo, and the next read recomputes. The store's own write path notifies
//! synchronously before the write call returns, so a completed append is
//! always visible to the next read; external edits are detected by polling
//! and settle within one poll interval.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::error::StoreError;
use crate::notify::ChangeNotifier;
use crate::record::Record;
use crate::store::FileStore;

/// Derived aggregate over the full collection.
///
/// `averagePrice` is NaN for an empty collection, which serializes as JSON
/// `null` — a recognized edge case, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub total: usize,
    #[serde(rename = "averagePrice")]
    pub average_price: f64,
}

impl Stats {
    pub fn compute(records: &[Record]) -> Self {
        let total = records.len();
        let sum: f64 = records.iter().map(|r| r.price).sum();
        Stats {
            total,
            average_price: sum / total as f64,
        }
    }
}

/// Lazily populated, mutation-invalidated memo of [`Stats`].
///
/// `None` = Invalid, `Some` = Valid. Created empty; populated on the first
/// read; invalidated by change notifications; never persisted.
///
/// Clone-friendly (cloning shares the same underlying entry), so the same
/// cache can be handed to change listeners and request handlers.
#[derive(Clone)]
pub struct StatsCache {
    entry: Arc<Mutex<Option<Stats>>>,
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsCache {
    pub fn new() -> Self {
        Self {
            entry: Arc::new(Mutex::new(None)),
        }
    }

    /// Return the memoized snapshot, recomputing from the store on a miss.
    ///
    /// The entry lock is held across the recompute so an invalidation racing
    /// the load lands after the memo is stored and takes effect on the next
    /// read. A failed load leaves the cache Invalid — no partial entry.
    pub fn get_or_compute(&self, store: &FileStore) -> Result<Stats, StoreError> {
        let mut entry = self
            .entry
            .lock()
            .map_err(|_| StoreError::LockPoisoned("stats read"))?;

        if let Some(stats) = *entry {
            tracing::debug!("serving stats from cache");
            return Ok(stats);
        }

        let collection = store.load_all()?;
        let stats = Stats::compute(&collection.records);
        *entry = Some(stats);
        tracing::debug!(total = stats.total, "recomputed stats");
        Ok(stats)
    }

    /// Drop the memo. A no-op while already Invalid.
    pub fn invalidate(&self) {
        match self.entry.lock() {
            Ok(mut entry) => {
                if entry.take().is_some() {
                    tracing::debug!("stats cache invalidated");
                }
            }
            Err(_) => tracing::warn!("stats cache lock poisoned; entry stuck invalid"),
        }
    }

    /// Whether the cache currently holds a snapshot. Mainly for tests.
    pub fn is_valid(&self) -> bool {
        self.entry.lock().map(|e| e.is_some()).unwrap_or(false)
    }

    /// Register this cache's `invalidate` as a change listener.
    pub fn subscribe(&self, notifier: &ChangeNotifier) {
        let cache = self.clone();
        notifier.subscribe(move || cache.invalidate());
    }
}
