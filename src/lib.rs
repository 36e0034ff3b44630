//! File-backed item catalog.
//!
//! The whole catalog lives in one JSON file. [`FileStore`] reads and writes it
//! as a unit, [`query`] slices it into filtered pages, and [`StatsCache`]
//! memoizes the derived aggregate until the backing file changes — through this
//! process's own writes or an external edit picked up by [`FileWatcher`].

mod error;
mod notify;
mod query;
mod record;
mod stats;
mod store;
mod watch;

#[cfg(feature = "http")]
pub mod http;

pub use error::StoreError;
pub use notify::ChangeNotifier;
pub use query::{find_by_id, query, QueryParams, QueryResult};
pub use record::{NewRecord, Record};
pub use stats::{Stats, StatsCache};
pub use store::{Collection, FileStore};
pub use watch::FileWatcher;
