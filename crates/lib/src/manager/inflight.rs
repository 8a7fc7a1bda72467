//! At most one outstanding fetch per path.
//!
//! The first caller for a path becomes the leader and performs the fetch;
//! later callers receive a oneshot receiver that resolves with the leader's
//! result. The leader's [`LeaderGuard`] removes the entry when it completes
//! or is dropped, so a fetch that failed or was cancelled is retried by the
//! next caller.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::client::FetchError;
use crate::model::Model;

pub(crate) type FetchResult = Result<Model, FetchError>;

struct Pending {
    generation: u64,
    waiters: Vec<oneshot::Sender<FetchResult>>,
}

type PendingMap = Arc<Mutex<HashMap<String, Pending>>>;

/// Registry of fetches in progress, keyed by path.
#[derive(Default)]
pub(crate) struct InFlight {
    pending: PendingMap,
    generation: AtomicU64,
}

/// Outcome of joining the registry for a path.
pub(crate) enum Role {
    Leader(LeaderGuard),
    Follower(oneshot::Receiver<FetchResult>),
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the fetch of `path`, becoming its leader if none is running.
    pub fn join(&self, path: &str) -> Role {
        let mut pending = self.pending.lock().unwrap();

        if let Some(entry) = pending.get_mut(path) {
            let (tx, rx) = oneshot::channel();
            entry.waiters.push(tx);
            return Role::Follower(rx);
        }

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        pending.insert(
            path.to_string(),
            Pending {
                generation,
                waiters: Vec::new(),
            },
        );

        Role::Leader(LeaderGuard {
            pending: Arc::clone(&self.pending),
            path: path.to_string(),
            generation,
        })
    }

    /// Number of paths currently being fetched.
    pub fn len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Forget every fetch in progress. Their followers observe a cancellation.
    pub fn clear(&self) {
        self.pending.lock().unwrap().clear();
    }
}

/// Held by the caller performing a fetch.
pub(crate) struct LeaderGuard {
    pending: PendingMap,
    path: String,
    generation: u64,
}

impl LeaderGuard {
    /// Hand the result to every follower and release the path.
    pub fn complete(self, result: &FetchResult) {
        for waiter in self.take_waiters() {
            // A follower that stopped waiting is not an error
            let _ = waiter.send(result.clone());
        }
    }

    fn take_waiters(&self) -> Vec<oneshot::Sender<FetchResult>> {
        let mut pending = self.pending.lock().unwrap();

        match pending.get(&self.path) {
            Some(entry) if entry.generation == self.generation => pending
                .remove(&self.path)
                .map(|entry| entry.waiters)
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

impl Drop for LeaderGuard {
    fn drop(&mut self) {
        // Dropping the senders wakes the followers with a cancellation
        drop(self.take_waiters());
    }
}
