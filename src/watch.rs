//! Polling watcher for external mutations of the backing file.
//!
//! The store's own writes already fire its notifier; this thread covers edits
//! made by other processes. Polling keeps the trigger portable — an OS-level
//! watch could replace it without touching any subscriber, since both sides
//! only meet at [`ChangeNotifier`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use crate::notify::ChangeNotifier;

/// A background thread that polls file metadata and fires a notifier when the
/// backing file changes.
pub struct FileWatcher {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl FileWatcher {
    /// Spawn a watcher over `path`, checking every `poll_interval`.
    ///
    /// A change is any difference in (mtime, length) since the last poll,
    /// including the file appearing or disappearing. Two same-length writes
    /// inside one mtime granule can be missed; in-process writes don't rely
    /// on this path.
    pub fn spawn(
        path: impl Into<PathBuf>,
        poll_interval: Duration,
        notifier: ChangeNotifier,
    ) -> Self {
        let path = path.into();
        let (stop_tx, stop_rx) = channel();

        let handle = thread::spawn(move || {
            let mut last_seen = probe(&path);

            loop {
                match stop_rx.try_recv() {
                    Ok(()) | Err(TryRecvError::Disconnected) => break,
                    Err(TryRecvError::Empty) => {}
                }

                let current = probe(&path);
                if current != last_seen {
                    tracing::debug!(path = %path.display(), "backing file changed");
                    notifier.notify();
                    last_seen = current;
                }

                thread::sleep(poll_interval);
            }
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Signal the watcher to stop and wait for it to finish.
    pub fn stop(mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
        // Don't join on drop - let the thread finish naturally
    }
}

fn probe(path: &Path) -> Option<(SystemTime, u64)> {
    let meta = fs::metadata(path).ok()?;
    Some((meta.modified().ok()?, meta.len()))
}
