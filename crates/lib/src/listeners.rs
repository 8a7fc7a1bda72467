//! Listener registry for page model changes.
//!
//! Listeners are registered under a root-relative path key (the empty string
//! stands for the root page, see [`crate::path::adapt_page_path`]) and are
//! notified only when exactly that key changes. There is no ancestor or
//! prefix matching.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::Result;

/// Callback invoked after the model at a listened path changed.
///
/// A failing listener, whether it returns an error or panics, is logged and
/// does not prevent the remaining listeners from running.
pub trait Listener: Send + Sync {
    /// Called with the registry key that changed.
    fn on_change(&self, key: &str) -> Result<()>;
}

impl<F> Listener for F
where
    F: Fn(&str) -> Result<()> + Send + Sync,
{
    fn on_change(&self, key: &str) -> Result<()> {
        self(key)
    }
}

/// Handle returned on registration, used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listeners grouped by path key, in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<HashMap<String, Vec<(ListenerId, Arc<dyn Listener>)>>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener under `key`.
    pub fn add(&self, key: impl Into<String>, listener: Arc<dyn Listener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap()
            .entry(key.into())
            .or_default()
            .push((id, listener));
        id
    }

    /// Remove a listener. Returns false if it was not registered under `key`.
    pub fn remove(&self, key: &str, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap();

        let Some(entries) = listeners.get_mut(key) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        let removed = entries.len() != before;

        if entries.is_empty() {
            listeners.remove(key);
        }

        removed
    }

    /// Invoke every listener registered under `key`, in registration order.
    ///
    /// The lock is released before the listeners run, so a listener may
    /// register or remove listeners itself. Returns the number of listeners
    /// that completed successfully.
    pub fn notify(&self, key: &str) -> usize {
        let snapshot: Vec<Arc<dyn Listener>> = {
            let listeners = self.listeners.lock().unwrap();
            match listeners.get(key) {
                Some(entries) => entries.iter().map(|(_, l)| Arc::clone(l)).collect(),
                None => return 0,
            }
        };

        tracing::debug!(key, count = snapshot.len(), "Notifying listeners");

        let mut succeeded = 0;
        for listener in snapshot {
            match panic::catch_unwind(AssertUnwindSafe(|| listener.on_change(key))) {
                Ok(Ok(())) => succeeded += 1,
                Ok(Err(e)) => tracing::error!(key, "Listener failed: {e}"),
                Err(payload) => {
                    tracing::error!(key, "Listener panicked: {}", panic_message(&*payload))
                }
            }
        }
        succeeded
    }

    /// Number of listeners registered under `key`.
    pub fn count(&self, key: &str) -> usize {
        self.listeners
            .lock()
            .unwrap()
            .get(key)
            .map_or(0, Vec::len)
    }

    /// Check if no listener is registered at all.
    pub fn is_empty(&self) -> bool {
        self.listeners.lock().unwrap().is_empty()
    }

    /// Drop every listener.
    pub fn clear(&self) {
        self.listeners.lock().unwrap().clear();
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.listeners.lock().unwrap();
        f.debug_struct("ListenerRegistry")
            .field("keys", &listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
