//! Background tasks of a running crawl
//!
//! - Fetch workers: each one repeatedly takes a pending URL from the
//!   frontier, downloads it, and deposits the body (or drops the URL on
//!   failure). Workers are symmetric; any of them can handle any URL.
//! - Checkpoint writer: after an initial grace period, snapshots the
//!   frontier into alternating checkpoint slots at a fixed interval.
//!
//! Neither task ever returns on its own; the crawl driver aborts them.

use crate::crawler::fetcher::Fetch;
use crate::output::CrawlStats;
use crate::state::Frontier;
use crate::storage::CheckpointStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Spawns `count` fetch workers
pub fn spawn_fetch_workers<F: Fetch>(
    count: usize,
    frontier: Arc<Frontier>,
    fetcher: Arc<F>,
    poll_interval: Duration,
    stats: Arc<CrawlStats>,
) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|worker_id| {
            tokio::spawn(fetch_worker(
                worker_id,
                frontier.clone(),
                fetcher.clone(),
                poll_interval,
                stats.clone(),
            ))
        })
        .collect()
}

async fn fetch_worker<F: Fetch>(
    worker_id: usize,
    frontier: Arc<Frontier>,
    fetcher: Arc<F>,
    poll_interval: Duration,
    stats: Arc<CrawlStats>,
) {
    tracing::debug!("Fetch worker {} started", worker_id);

    loop {
        let Some(url) = frontier.try_dequeue_pending() else {
            // Nothing pending, or the completed buffer is full
            frontier.wait_for_work(poll_interval).await;
            continue;
        };

        tracing::trace!("Worker {} fetching {}", worker_id, url);

        match fetcher.fetch(&url).await {
            Ok(body) => {
                stats.record_fetch();
                frontier.complete_fetch(&url, body);
            }
            Err(e) => {
                tracing::warn!("Error getting {}: {}", url, e);
                stats.record_fetch_failure();
                frontier.drop_fetch(&url);
            }
        }
    }
}

/// Spawns the checkpoint writer
pub fn spawn_checkpoint_writer(
    frontier: Arc<Frontier>,
    store: CheckpointStore,
    initial_delay: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(checkpoint_writer(frontier, store, initial_delay, interval))
}

async fn checkpoint_writer(
    frontier: Arc<Frontier>,
    store: CheckpointStore,
    initial_delay: Duration,
    interval: Duration,
) {
    tokio::time::sleep(initial_delay).await;

    let mut slot = 0;
    loop {
        let checkpoint = frontier.snapshot();
        let pending = checkpoint.links_to_visit.len();
        let visited = checkpoint.visited_links.len();

        let writer = store.clone();
        let path = store.slot_path(slot);
        match tokio::task::spawn_blocking(move || writer.save(slot, &checkpoint)).await {
            Ok(Ok(())) => tracing::debug!(
                "Checkpoint written to {} ({} to visit, {} visited)",
                path.display(),
                pending,
                visited
            ),
            Ok(Err(e)) => tracing::warn!("Failed to write checkpoint {}: {}", path.display(), e),
            Err(e) => tracing::warn!("Checkpoint task for {} failed: {}", path.display(), e),
        }

        slot = (slot + 1) % store.slot_count();
        tokio::time::sleep(interval).await;
    }
}
