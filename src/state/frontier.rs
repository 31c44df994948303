//! Shared crawl frontier
//!
//! Four collections make up the frontier:
//!
//! - `pending`: discovered URLs not yet handed to a fetch worker
//! - `in_flight`: URLs a fetch worker is currently downloading
//! - `visited`: every URL ever dispatched; only grows
//! - `completed`: fetched bodies waiting for the crawl driver
//!
//! All of them sit behind one mutex so no operation can observe a URL halfway
//! between two collections. A URL is added to `visited` at the moment it
//! leaves `pending`, which keeps concurrent link extraction from queueing it
//! again.

use crate::storage::Checkpoint;
use serde::Deserialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

/// Order in which queued entries are handed out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DequeueOrder {
    /// Most recently added first (depth-biased crawl)
    #[default]
    Lifo,
    /// Oldest first (breadth-first crawl)
    Fifo,
}

/// A fetched document waiting to be consumed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedFetch {
    pub url: String,
    pub body: Vec<u8>,
}

/// Point-in-time sizes of the frontier collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontierCounts {
    pub pending: usize,
    pub in_flight: usize,
    pub visited: usize,
    pub completed: usize,
}

#[derive(Debug, Default)]
struct FrontierState {
    pending: VecDeque<String>,
    pending_set: HashSet<String>,
    in_flight: HashSet<String>,
    visited: HashSet<String>,
    completed: HashMap<String, Vec<u8>>,
    completed_order: VecDeque<String>,
}

impl FrontierState {
    fn is_known(&self, url: &str) -> bool {
        self.visited.contains(url)
            || self.in_flight.contains(url)
            || self.completed.contains_key(url)
            || self.pending_set.contains(url)
    }

    fn push_pending(&mut self, url: String) -> bool {
        if self.pending_set.insert(url.clone()) {
            self.pending.push_back(url);
            true
        } else {
            false
        }
    }
}

/// The crawl frontier shared between fetch workers and the crawl driver
#[derive(Debug)]
pub struct Frontier {
    state: Mutex<FrontierState>,

    /// Maximum number of fetched-but-unconsumed pages (B)
    capacity: usize,

    order: DequeueOrder,

    /// Signalled when `pending` grows or a completed-buffer slot frees up
    work_available: Notify,

    /// Signalled when `completed` grows or the frontier may have drained
    page_ready: Notify,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `capacity` - Bound on the completed buffer; clamped to at least 1
    /// * `order` - Dispatch order for pending URLs
    pub fn new(capacity: usize, order: DequeueOrder) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            capacity: capacity.max(1),
            order,
            work_available: Notify::new(),
            page_ready: Notify::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds `url` to `pending` unless it was already visited
    ///
    /// Returns true if the URL was queued.
    pub fn seed(&self, url: &str) -> bool {
        let added = {
            let mut state = self.lock();
            if state.visited.contains(url) {
                false
            } else {
                state.push_pending(url.to_string())
            }
        };

        if added {
            self.work_available.notify_waiters();
        }
        added
    }

    /// Takes one pending URL and marks it in flight and visited
    ///
    /// Returns `None` when nothing is pending or when the completed buffer has
    /// no free slot. Every URL in flight reserves a completed-buffer slot, so
    /// `completed` can never grow past the capacity no matter how many
    /// fetches finish at once.
    pub fn try_dequeue_pending(&self) -> Option<String> {
        let mut state = self.lock();

        if state.completed.len() + state.in_flight.len() >= self.capacity {
            return None;
        }

        let url = match self.order {
            DequeueOrder::Lifo => state.pending.pop_back(),
            DequeueOrder::Fifo => state.pending.pop_front(),
        }?;

        state.pending_set.remove(&url);
        state.in_flight.insert(url.clone());
        state.visited.insert(url.clone());
        Some(url)
    }

    /// Moves a finished download from `in_flight` into `completed`
    ///
    /// A URL that is not in flight (the frontier was cleared while it was
    /// being fetched) is discarded.
    pub fn complete_fetch(&self, url: &str, body: Vec<u8>) {
        {
            let mut state = self.lock();
            if !state.in_flight.remove(url) {
                tracing::debug!("Discarding fetch result for {} (not in flight)", url);
                return;
            }
            state.completed_order.push_back(url.to_string());
            state.completed.insert(url.to_string(), body);
        }

        self.page_ready.notify_waiters();
    }

    /// Removes a failed download from `in_flight`; the URL is not retried
    pub fn drop_fetch(&self, url: &str) {
        self.lock().in_flight.remove(url);

        // A slot freed up, and the crawl may have just drained
        self.work_available.notify_waiters();
        self.page_ready.notify_waiters();
    }

    /// Takes the oldest fetched page out of the completed buffer
    pub fn try_dequeue_completed(&self) -> Option<CompletedFetch> {
        let fetched = {
            let mut state = self.lock();
            let url = state.completed_order.pop_front()?;
            let body = state.completed.remove(&url).unwrap_or_default();
            CompletedFetch { url, body }
        };

        self.work_available.notify_waiters();
        Some(fetched)
    }

    /// Queues every URL that is not already known to the frontier
    ///
    /// Known means visited, in flight, waiting in `completed`, or already
    /// pending. Returns the number of URLs added.
    pub fn enqueue_discovered<I>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let added = {
            let mut state = self.lock();
            let mut added = 0;
            for url in urls {
                if !state.is_known(&url) && state.push_pending(url) {
                    added += 1;
                }
            }
            added
        };

        if added > 0 {
            self.work_available.notify_waiters();
        }
        added
    }

    /// True when nothing is pending, in flight, or waiting to be consumed
    pub fn is_drained(&self) -> bool {
        let state = self.lock();
        state.pending.is_empty() && state.in_flight.is_empty() && state.completed.is_empty()
    }

    /// Copies `pending ∪ in_flight` and `visited` into a timestamped checkpoint
    pub fn snapshot(&self) -> Checkpoint {
        let (links_to_visit, visited_links) = {
            let state = self.lock();
            let links: Vec<String> = state
                .pending
                .iter()
                .chain(state.in_flight.iter())
                .cloned()
                .collect();
            let visited: Vec<String> = state.visited.iter().cloned().collect();
            (links, visited)
        };

        Checkpoint::new(links_to_visit, visited_links)
    }

    /// Replaces the frontier contents with a checkpoint
    ///
    /// URLs that were in flight when the checkpoint was taken are also in
    /// `visited`; they go back to `pending` regardless so they get fetched
    /// again.
    pub fn restore(&self, checkpoint: Checkpoint) {
        {
            let mut state = self.lock();
            *state = FrontierState::default();
            state.visited.extend(checkpoint.visited_links);
            for url in checkpoint.links_to_visit {
                state.push_pending(url);
            }
        }

        self.work_available.notify_waiters();
    }

    /// Empties all four collections
    pub fn clear(&self) {
        *self.lock() = FrontierState::default();
    }

    pub fn counts(&self) -> FrontierCounts {
        let state = self.lock();
        FrontierCounts {
            pending: state.pending.len(),
            in_flight: state.in_flight.len(),
            visited: state.visited.len(),
            completed: state.completed.len(),
        }
    }

    /// Waits until new work may be available, at most `timeout`
    pub async fn wait_for_work(&self, timeout: Duration) {
        let _ = tokio::time::timeout(timeout, self.work_available.notified()).await;
    }

    /// Waits until a page may be ready for the driver, at most `timeout`
    pub async fn wait_for_page(&self, timeout: Duration) {
        let _ = tokio::time::timeout(timeout, self.page_ready.notified()).await;
    }
}
