use std::fmt;

/// Error type for record store operations.
///
/// `Unavailable` and `Corrupt` both surface as 500-class failures at the HTTP
/// boundary; neither is retried. A corrupt backing file is not recoverable
/// without operator intervention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing file could not be read or written (missing, permissions, io).
    Unavailable(String),
    /// The backing file's bytes do not parse as a record collection.
    Corrupt(String),
    /// An internal lock was poisoned by a panicking holder.
    LockPoisoned(&'static str),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(message) => write!(f, "store unavailable: {}", message),
            StoreError::Corrupt(message) => write!(f, "store corrupt: {}", message),
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for StoreError {}
