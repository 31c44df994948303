//! Extraction queue
//!
//! A shared bag of `(title, document)` jobs between the crawl loop and the
//! extraction workers. One mutex guards the entries and the count of jobs a
//! worker has taken but not finished, so "empty and idle" can be checked
//! atomically.

use crate::state::DequeueOrder;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

/// A document waiting for sentence extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionJob {
    pub title: String,
    pub document: Vec<u8>,
}

#[derive(Debug, Default)]
struct QueueState {
    entries: VecDeque<ExtractionJob>,
    in_progress: usize,
}

/// Shared queue of documents awaiting extraction
#[derive(Debug)]
pub struct ExtractionQueue {
    state: Mutex<QueueState>,
    order: DequeueOrder,

    /// Soft bound checked by producers through [`ExtractionQueue::is_full`]
    capacity: Option<usize>,

    pushed: Notify,
    released: Notify,
}

impl ExtractionQueue {
    pub fn new(order: DequeueOrder, capacity: Option<usize>) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            order,
            capacity,
            pushed: Notify::new(),
            released: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Adds a document; never blocks and never rejects
    ///
    /// Producers that want backpressure check [`ExtractionQueue::is_full`]
    /// first.
    pub fn push(&self, title: String, document: Vec<u8>) {
        self.lock()
            .entries
            .push_back(ExtractionJob { title, document });
        self.pushed.notify_waiters();
    }

    /// Takes one job, marking it in progress until [`ExtractionQueue::task_done`]
    pub fn try_pop(&self) -> Option<ExtractionJob> {
        let job = {
            let mut state = self.lock();
            let job = match self.order {
                DequeueOrder::Lifo => state.entries.pop_back(),
                DequeueOrder::Fifo => state.entries.pop_front(),
            }?;
            state.in_progress += 1;
            job
        };

        self.released.notify_waiters();
        Some(job)
    }

    /// Marks a job taken with [`ExtractionQueue::try_pop`] as finished
    pub fn task_done(&self) {
        {
            let mut state = self.lock();
            state.in_progress = state.in_progress.saturating_sub(1);
        }
        self.released.notify_waiters();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// True when a capacity is set and reached
    pub fn is_full(&self) -> bool {
        match self.capacity {
            Some(capacity) => self.len() >= capacity,
            None => false,
        }
    }

    /// True when no job is queued and none is being processed
    pub fn is_idle(&self) -> bool {
        let state = self.lock();
        state.entries.is_empty() && state.in_progress == 0
    }

    /// Waits until a job may have been pushed, at most `timeout`
    pub async fn wait_for_job(&self, timeout: Duration) {
        let _ = tokio::time::timeout(timeout, self.pushed.notified()).await;
    }

    /// Waits until a job may have been taken or finished, at most `timeout`
    pub async fn wait_for_release(&self, timeout: Duration) {
        let _ = tokio::time::timeout(timeout, self.released.notified()).await;
    }
}
