//! Crawl driver - the single consumer of the frontier
//!
//! The driver owns the crawl lifecycle:
//!
//! ```text
//! Idle --start()--> Running --frontier drained--> Drained (terminal)
//! ```
//!
//! [`CrawlDriver::start`] tears down any previous run, clears the frontier,
//! restores the freshest checkpoint (or seeds the initial URL), and launches
//! the fetch workers and the checkpoint writer. [`CrawlDriver::next`] never
//! blocks: it returns a page, [`NextPage::NotReady`] when pages are still being
//! fetched, or [`NextPage::Finished`] once nothing is pending, in flight, or
//! waiting. Callers that want to sleep between polls use
//! [`CrawlDriver::wait_ready`].

use crate::config::Config;
use crate::crawler::fetcher::Fetch;
use crate::crawler::parser::{DocumentParser, HtmlDocumentParser};
use crate::crawler::scope::LinkScope;
use crate::crawler::workers::{spawn_checkpoint_writer, spawn_fetch_workers};
use crate::output::CrawlStats;
use crate::state::{CompletedFetch, Frontier};
use crate::storage::CheckpointStore;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A fetched page handed to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawledPage {
    pub url: String,
    pub title: String,
    /// Raw document bytes as downloaded
    pub body: Vec<u8>,
}

/// Result of polling the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// A page is ready
    Ready(CrawledPage),
    /// Pages are still being fetched; poll again later
    NotReady,
    /// The crawl has drained (or was never started)
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriverState {
    Idle,
    Running,
    Drained,
}

#[derive(Debug, Clone)]
struct CheckpointSettings {
    store: CheckpointStore,
    initial_delay: Duration,
    interval: Duration,
}

/// Restartable crawl over one document collection
pub struct CrawlDriver<F: Fetch> {
    frontier: Arc<Frontier>,
    fetcher: Arc<F>,
    parser: Arc<dyn DocumentParser>,
    scope: LinkScope,
    initial_url: String,
    fetch_workers: usize,
    poll_interval: Duration,
    checkpoint: Option<CheckpointSettings>,
    stats: Arc<CrawlStats>,
    workers: Vec<JoinHandle<()>>,
    state: DriverState,
}

impl<F: Fetch> CrawlDriver<F> {
    /// Creates an idle driver from the configuration
    ///
    /// Opens (and creates) the checkpoint directory when one is configured.
    pub fn new(config: &Config, fetcher: F) -> Result<Self> {
        let crawler = &config.crawler;

        let checkpoint = match &config.checkpoint.directory {
            Some(directory) => Some(CheckpointSettings {
                store: CheckpointStore::open(directory)?,
                initial_delay: config.checkpoint.initial_delay(),
                interval: config.checkpoint.interval(),
            }),
            None => None,
        };

        Ok(Self {
            frontier: Arc::new(Frontier::new(
                crawler.completed_buffer as usize,
                crawler.dequeue_order,
            )),
            fetcher: Arc::new(fetcher),
            parser: Arc::new(HtmlDocumentParser::wikipedia()?),
            scope: LinkScope::from_config(crawler),
            initial_url: crawler.initial_url(),
            fetch_workers: crawler.fetch_workers as usize,
            poll_interval: crawler.poll_interval(),
            checkpoint,
            stats: Arc::new(CrawlStats::default()),
            workers: Vec::new(),
            state: DriverState::Idle,
        })
    }

    /// Replaces the document parser
    pub fn with_parser(mut self, parser: Arc<dyn DocumentParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Shares a statistics sink with other components
    pub fn with_stats(mut self, stats: Arc<CrawlStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn frontier(&self) -> &Arc<Frontier> {
        &self.frontier
    }

    pub fn stats(&self) -> &Arc<CrawlStats> {
        &self.stats
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    /// Deletes existing checkpoint files so the next start is a cold one
    pub fn discard_checkpoints(&self) -> Result<()> {
        if let Some(settings) = &self.checkpoint {
            settings.store.remove_all()?;
            tracing::info!(
                "Discarded progress files in {}",
                settings.store.directory().display()
            );
        }
        Ok(())
    }

    /// Starts (or restarts) the crawl
    ///
    /// Any workers from a previous run are stopped and awaited before the
    /// frontier is cleared, so nothing from the old run leaks into the new one.
    pub async fn start(&mut self) {
        self.abort_workers();
        for handle in self.workers.drain(..) {
            let _ = handle.await;
        }
        self.frontier.clear();

        let restored = self
            .checkpoint
            .as_ref()
            .and_then(|settings| settings.store.load_latest());

        match restored {
            Some(checkpoint) => {
                tracing::info!(
                    "Scraper progress file loaded, links_to_visit: {}, visited_links: {}",
                    checkpoint.links_to_visit.len(),
                    checkpoint.visited_links.len()
                );
                self.frontier.restore(checkpoint);
            }
            None => {
                tracing::info!("Starting crawl from {}", self.initial_url);
                self.frontier.seed(&self.initial_url);
            }
        }

        self.workers = spawn_fetch_workers(
            self.fetch_workers,
            self.frontier.clone(),
            self.fetcher.clone(),
            self.poll_interval,
            self.stats.clone(),
        );

        if let Some(settings) = &self.checkpoint {
            self.workers.push(spawn_checkpoint_writer(
                self.frontier.clone(),
                settings.store.clone(),
                settings.initial_delay,
                settings.interval,
            ));
        }

        self.state = DriverState::Running;
    }

    /// Returns the next page without blocking
    ///
    /// Each returned page has had its same-collection links queued in the
    /// frontier. Documents that cannot be parsed are logged and skipped.
    pub fn next(&mut self) -> NextPage {
        if self.state != DriverState::Running {
            return NextPage::Finished;
        }

        loop {
            if self.frontier.is_drained() {
                self.stop();
                self.state = DriverState::Drained;
                tracing::info!(
                    "Crawl drained after visiting {} pages",
                    self.frontier.counts().visited
                );
                return NextPage::Finished;
            }

            let Some(CompletedFetch { url, body }) = self.frontier.try_dequeue_completed() else {
                return NextPage::NotReady;
            };

            match self.follow_links(&url, &body) {
                Ok(title) => return NextPage::Ready(CrawledPage { url, title, body }),
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", url, e);
                    self.stats.record_document_skipped();
                }
            }
        }
    }

    /// Parses a fetched document, queues its same-collection links, and
    /// returns its title
    fn follow_links(&self, url: &str, body: &[u8]) -> Result<String> {
        let html = String::from_utf8_lossy(body);
        let parsed = self.parser.parse_page(&html)?;

        let links = self.scope.filter(&parsed.links);
        let added = self.frontier.enqueue_discovered(links);
        self.stats.record_page_yielded(added);

        tracing::debug!("Yielding '{}' ({}), {} new links", parsed.title, url, added);
        Ok(parsed.title)
    }

    /// Waits until a page may be ready, at most `timeout`
    pub async fn wait_ready(&self, timeout: Duration) {
        self.frontier.wait_for_page(timeout).await;
    }

    /// Aborts the fetch workers and the checkpoint writer
    ///
    /// In-flight downloads are abandoned; the frontier keeps its contents.
    pub fn stop(&mut self) {
        self.abort_workers();
        self.workers.clear();
        if self.state == DriverState::Running {
            self.state = DriverState::Idle;
        }
    }

    fn abort_workers(&self) {
        for handle in &self.workers {
            handle.abort();
        }
    }
}

impl<F: Fetch> Drop for CrawlDriver<F> {
    fn drop(&mut self) {
        self.abort_workers();
    }
}
