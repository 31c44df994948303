//! Crawler module for fetching a document collection
//!
//! This module contains the crawl engine, including:
//! - HTTP fetching behind the [`Fetch`] capability
//! - HTML parsing for titles, links and article text
//! - The same-collection link filter
//! - Fetch workers and the checkpoint writer
//! - The crawl driver that hands pages to the caller

mod driver;
mod fetcher;
mod parser;
mod scope;
mod workers;

pub use driver::{CrawlDriver, CrawledPage, NextPage};
pub use fetcher::{build_http_client, Fetch, HttpFetcher};
pub use parser::{DocumentParser, HtmlDocumentParser, ParsedPage};
pub use scope::LinkScope;
pub use workers::{spawn_checkpoint_writer, spawn_fetch_workers};
