//! Change notification for the backing store.
//!
//! Consumers that cache derived data subscribe here instead of watching any
//! particular filesystem primitive. The store fires the notifier on its own
//! write path; a [`FileWatcher`](crate::FileWatcher) feeds the same notifier
//! for external edits. Listeners run synchronously on the notifying thread,
//! so a mutation made through the store is observed by every listener before
//! the mutating call returns.

use std::sync::{Arc, Mutex};

type Listener = Box<dyn Fn() + Send + Sync>;

/// Subscription point for "the backing store changed" events.
///
/// Clone-friendly (cloning shares the same underlying listener set).
#[derive(Clone)]
pub struct ChangeNotifier {
    listeners: Arc<Mutex<Vec<Listener>>>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a listener invoked on every change notification.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        match self.listeners.lock() {
            Ok(mut listeners) => listeners.push(Box::new(listener)),
            Err(_) => tracing::warn!("change notifier lock poisoned; listener dropped"),
        }
    }

    /// Fire all listeners on the calling thread.
    ///
    /// The registry lock is held for the duration of the fan-out, so
    /// listeners must not subscribe or notify reentrantly.
    pub fn notify(&self) {
        match self.listeners.lock() {
            Ok(listeners) => {
                for listener in listeners.iter() {
                    listener();
                }
            }
            Err(_) => tracing::warn!("change notifier lock poisoned; notification dropped"),
        }
    }
}
