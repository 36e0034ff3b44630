//! Whole-file JSON record store.
//!
//! The entire collection is read, modified in memory, and written back as one
//! unit. There is no indexing and no partial update — every create is O(n) in
//! the collection size. In-process appends are serialized by a write mutex;
//! a second process writing the same file remains last-writer-wins.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use xxhash_rust::xxh3::xxh3_64;

use crate::error::StoreError;
use crate::notify::ChangeNotifier;
use crate::record::{NewRecord, Record};

/// The full record collection as read from disk: parsed records plus the
/// exact raw bytes, for content-fingerprinting consumers.
#[derive(Debug, Clone)]
pub struct Collection {
    pub records: Vec<Record>,
    pub raw: Vec<u8>,
}

impl Collection {
    /// Content hash of the raw bytes, suitable as an ETag value.
    pub fn fingerprint(&self) -> String {
        format!("{:016x}", xxh3_64(&self.raw))
    }
}

/// Single-file record store.
pub struct FileStore {
    path: PathBuf,
    notifier: ChangeNotifier,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store over the given backing file. The file is not touched
    /// until the first read or write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        FileStore {
            path: path.into(),
            notifier: ChangeNotifier::new(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The notifier fired after every successful mutation through this store.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Read and parse the entire backing file.
    ///
    /// An unreadable file is `Unavailable`; unparsable content is `Corrupt`,
    /// never a silently empty collection.
    pub fn load_all(&self) -> Result<Collection, StoreError> {
        let raw = fs::read(&self.path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", self.path.display(), e)))?;
        let records: Vec<Record> = serde_json::from_slice(&raw)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.path.display(), e)))?;
        Ok(Collection { records, raw })
    }

    /// Assign a fresh id to `new`, append it, and persist the full collection.
    ///
    /// Returns the record as stored. A failed write propagates as an error;
    /// there is no partial success.
    pub fn append(&self, new: NewRecord) -> Result<Record, StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::LockPoisoned("append"))?;

        let Collection { mut records, .. } = self.load_all()?;
        let id = next_id(&records);
        let record = new.into_record(id);
        records.push(record.clone());
        self.persist(&records)?;

        tracing::debug!(id, total = records.len(), "record appended");
        self.notifier.notify();
        Ok(record)
    }

    /// Write the full collection back via temp file + rename, so a concurrent
    /// reader never observes a half-written file.
    fn persist(&self, records: &[Record]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(records)
            .map_err(|e| StoreError::Unavailable(format!("encode: {}", e)))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, &bytes)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| StoreError::Unavailable(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

/// Collision-checked timestamp id: wall-clock millis, bumped past the highest
/// existing id when rapid creates land in the same millisecond. Caller holds
/// the write lock.
fn next_id(records: &[Record]) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64);
    match records.iter().map(|r| r.id).max() {
        Some(max) => now.max(max + 1),
        None => now,
    }
}
