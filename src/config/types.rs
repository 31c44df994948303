use crate::state::DequeueOrder;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Wiki-Trawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub checkpoint: CheckpointConfig,
    pub extraction: ExtractionConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Language tag, selects the collection address and sentence pattern
    pub language: String,

    /// Base address of the collection (defaults to `https://{language}.wikipedia.org`)
    #[serde(rename = "base-url", default)]
    pub base_url: Option<String>,

    /// First URL to fetch (defaults to the base address)
    #[serde(rename = "initial-url", default)]
    pub initial_url: Option<String>,

    /// Path prefix a link must carry to stay inside the collection
    #[serde(rename = "link-prefix", default = "default_link_prefix")]
    pub link_prefix: String,

    /// Number of concurrent fetch workers
    #[serde(rename = "fetch-workers", default = "default_workers")]
    pub fetch_workers: u32,

    /// Maximum number of fetched pages waiting for the crawl driver
    #[serde(rename = "completed-buffer", default = "default_completed_buffer")]
    pub completed_buffer: u32,

    /// Upper bound on how long an idle worker sleeps before re-checking (milliseconds)
    #[serde(rename = "poll-interval", default = "default_poll_interval")]
    pub poll_interval: u64,

    /// Order in which pending URLs are dispatched
    #[serde(rename = "dequeue-order", default)]
    pub dequeue_order: DequeueOrder,
}

impl CrawlerConfig {
    /// Returns the collection base address without a trailing slash
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.wikipedia.org", self.language),
        }
    }

    /// Returns the URL the crawl is seeded with
    pub fn initial_url(&self) -> String {
        self.initial_url.clone().unwrap_or_else(|| self.base_url())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval)
    }
}

/// Checkpoint (progress file) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CheckpointConfig {
    /// Directory holding the two alternating progress files; `None` disables checkpointing
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Seconds to wait before writing the first checkpoint
    #[serde(rename = "initial-delay", default = "default_checkpoint_secs")]
    pub initial_delay: u64,

    /// Seconds between two checkpoint writes
    #[serde(default = "default_checkpoint_secs")]
    pub interval: u64,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            directory: None,
            initial_delay: default_checkpoint_secs(),
            interval: default_checkpoint_secs(),
        }
    }
}

impl CheckpointConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

/// Sentence extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Number of concurrent extraction workers, each with its own output file
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Directory receiving the per-worker `w{N}.txt` files
    #[serde(rename = "output-directory")]
    pub output_directory: PathBuf,

    /// Maximum number of documents waiting for extraction; `None` means unbounded
    #[serde(rename = "queue-capacity", default)]
    pub queue_capacity: Option<usize>,

    /// Order in which queued documents are picked up
    #[serde(rename = "dequeue-order", default)]
    pub dequeue_order: DequeueOrder,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

fn default_link_prefix() -> String {
    "/wiki/".to_string()
}

fn default_workers() -> u32 {
    8
}

fn default_completed_buffer() -> u32 {
    100
}

fn default_poll_interval() -> u64 {
    100
}

fn default_checkpoint_secs() -> u64 {
    10
}
