//! Configuration module for Wiki-Trawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use wiki_trawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawling {} with {} fetch workers", config.crawler.base_url(), config.crawler.fetch_workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CheckpointConfig, Config, CrawlerConfig, ExtractionConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
