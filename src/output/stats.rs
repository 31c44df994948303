//! Run statistics
//!
//! Fetch workers, the crawl driver and extraction workers all bump counters
//! on a shared [`CrawlStats`]; [`CrawlStats::snapshot`] turns them into a
//! plain [`CrawlStatistics`] for display.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared across tasks
#[derive(Debug, Default)]
pub struct CrawlStats {
    pages_fetched: AtomicU64,
    fetch_failures: AtomicU64,
    pages_yielded: AtomicU64,
    documents_skipped: AtomicU64,
    links_enqueued: AtomicU64,
    documents_extracted: AtomicU64,
    extraction_failures: AtomicU64,
    sentences_matched: AtomicU64,
}

impl CrawlStats {
    pub fn record_fetch(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A page was handed to the caller and contributed `links` new URLs
    pub fn record_page_yielded(&self, links: usize) {
        self.pages_yielded.fetch_add(1, Ordering::Relaxed);
        self.links_enqueued
            .fetch_add(links as u64, Ordering::Relaxed);
    }

    pub fn record_document_skipped(&self) {
        self.documents_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_extraction(&self, sentences: usize) {
        self.documents_extracted.fetch_add(1, Ordering::Relaxed);
        self.sentences_matched
            .fetch_add(sentences as u64, Ordering::Relaxed);
    }

    pub fn record_extraction_failure(&self) {
        self.extraction_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CrawlStatistics {
        CrawlStatistics {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            pages_yielded: self.pages_yielded.load(Ordering::Relaxed),
            documents_skipped: self.documents_skipped.load(Ordering::Relaxed),
            links_enqueued: self.links_enqueued.load(Ordering::Relaxed),
            documents_extracted: self.documents_extracted.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
            sentences_matched: self.sentences_matched.load(Ordering::Relaxed),
        }
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Documents downloaded successfully
    pub pages_fetched: u64,

    /// Downloads that failed and were dropped
    pub fetch_failures: u64,

    /// Pages returned by the crawl driver
    pub pages_yielded: u64,

    /// Fetched documents the driver could not parse
    pub documents_skipped: u64,

    /// New URLs added to the frontier through link extraction
    pub links_enqueued: u64,

    /// Documents processed by extraction workers
    pub documents_extracted: u64,

    /// Documents extraction workers had to skip
    pub extraction_failures: u64,

    /// Sentences written to the output logs
    pub sentences_matched: u64,
}

/// Prints crawl statistics to the console
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Crawl:");
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  Fetch failures (dropped): {}", stats.fetch_failures);
    println!("  Pages yielded: {}", stats.pages_yielded);
    println!("  Documents skipped: {}", stats.documents_skipped);
    println!("  Links enqueued: {}", stats.links_enqueued);
    println!();

    println!("Extraction:");
    println!("  Documents processed: {}", stats.documents_extracted);
    println!("  Documents skipped: {}", stats.extraction_failures);
    println!("  Sentences matched: {}", stats.sentences_matched);
    println!();

    let attempted = stats.pages_fetched + stats.fetch_failures;
    let success_rate = if attempted > 0 {
        (stats.pages_fetched as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Fetch Success Rate: {:.1}% ({} / {} pages)",
        success_rate, stats.pages_fetched, attempted
    );
}
