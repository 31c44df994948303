//! Wiki-Trawler: a checkpointed collection crawler with sentence mining
//!
//! This crate crawls a hyperlinked document collection (a Wikipedia language
//! edition by default) from a seed URL, following same-collection links, and
//! feeds every fetched document into a parallel sentence extraction pipeline
//! that keeps the sentences matching a language-specific pattern.

pub mod config;
pub mod crawler;
pub mod extraction;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Wiki-Trawler operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("HTML parse error: {0}")]
    HtmlParse(String),

    #[error("Invalid CSS selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Invalid sentence pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Wiki-Trawler operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlDriver, CrawledPage, NextPage};
pub use extraction::{ExtractionPool, ExtractionQueue, SentenceFilter};
pub use state::{DequeueOrder, Frontier};
pub use storage::{Checkpoint, CheckpointStore};
