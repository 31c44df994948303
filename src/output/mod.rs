//! Output module for extraction results and run statistics
//!
//! This module handles:
//! - Appending matched sentences to per-worker log files
//! - Counting crawl and extraction events and printing a summary

mod sentence_log;
pub mod stats;

pub use sentence_log::{format_line, SentenceLog};
pub use stats::{print_statistics, CrawlStatistics, CrawlStats};
