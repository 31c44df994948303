//! Wiki-Trawler main entry point
//!
//! This is the command-line interface for the Wiki-Trawler sentence miner.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wiki_trawler::config::{load_config_with_hash, Config};
use wiki_trawler::crawler::{CrawlDriver, HtmlDocumentParser, HttpFetcher, NextPage};
use wiki_trawler::extraction::{language_pattern, ExtractionPool, ExtractionQueue, SentenceFilter};
use wiki_trawler::output::{print_statistics, CrawlStats};

/// Wiki-Trawler: a checkpointed collection crawler with sentence mining
///
/// Wiki-Trawler crawls a Wikipedia language edition from a seed page,
/// follows links inside the collection, and writes every sentence that
/// matches the language's pattern to per-worker output files. Progress is
/// checkpointed so an interrupted crawl resumes where it left off.
#[derive(Parser, Debug)]
#[command(name = "wiki-trawler")]
#[command(version = "1.0.0")]
#[command(about = "A checkpointed collection crawler with sentence mining", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start a fresh crawl, discarding existing progress files
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Stop after this many pages have been handed to extraction
    #[arg(long, value_name = "N")]
    max_pages: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(config, cli.fresh, cli.max_pages).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wiki_trawler=info,warn"),
            1 => EnvFilter::new("wiki_trawler=debug,info"),
            2 => EnvFilter::new("wiki_trawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    let crawler = &config.crawler;

    println!("=== Wiki-Trawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Language: {}", crawler.language);
    println!("  Collection: {}", crawler.base_url());
    println!("  Initial URL: {}", crawler.initial_url());
    println!("  Link prefix: {}", crawler.link_prefix);
    println!("  Fetch workers: {}", crawler.fetch_workers);
    println!("  Completed buffer: {}", crawler.completed_buffer);
    println!("  Dequeue order: {:?}", crawler.dequeue_order);

    println!("\nCheckpoints:");
    match &config.checkpoint.directory {
        Some(directory) => {
            println!("  Directory: {}", directory.display());
            println!("  First write after: {}s", config.checkpoint.initial_delay);
            println!("  Interval: {}s", config.checkpoint.interval);
        }
        None => println!("  Disabled"),
    }

    println!("\nExtraction:");
    println!("  Workers: {}", config.extraction.workers);
    println!("  Output: {}", config.extraction.output_directory.display());
    match config.extraction.queue_capacity {
        Some(capacity) => println!("  Queue capacity: {}", capacity),
        None => println!("  Queue capacity: unbounded"),
    }
    println!("  Sentence pattern: {}", language_pattern(&crawler.language));

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool, max_pages: Option<u64>) -> anyhow::Result<()> {
    let poll_interval = config.crawler.poll_interval();
    let stats = Arc::new(CrawlStats::default());

    std::fs::create_dir_all(&config.extraction.output_directory).with_context(|| {
        format!(
            "creating output directory {}",
            config.extraction.output_directory.display()
        )
    })?;

    let fetcher = HttpFetcher::new(&config.user_agent).context("building HTTP client")?;
    let mut driver = CrawlDriver::new(&config, fetcher)
        .context("setting up crawl")?
        .with_stats(stats.clone());

    if fresh {
        tracing::info!("Starting fresh crawl (ignoring previous progress)");
        driver
            .discard_checkpoints()
            .context("discarding progress files")?;
    }

    let queue = Arc::new(ExtractionQueue::new(
        config.extraction.dequeue_order,
        config.extraction.queue_capacity,
    ));
    let filter = SentenceFilter::for_language(&config.crawler.language)
        .context("compiling sentence pattern")?;
    let pool = ExtractionPool::spawn(
        &config.extraction,
        queue.clone(),
        Arc::new(HtmlDocumentParser::wikipedia()?),
        Arc::new(filter),
        stats.clone(),
        poll_interval,
    )
    .context("starting extraction workers")?;

    driver.start().await;

    let crawl = async {
        let mut yielded: u64 = 0;
        loop {
            if queue.is_full() {
                queue.wait_for_release(poll_interval).await;
                continue;
            }

            match driver.next() {
                NextPage::Ready(page) => {
                    queue.push(page.title, page.body);
                    yielded += 1;
                    if max_pages.is_some_and(|max| yielded >= max) {
                        tracing::info!("Reached page limit of {}", yielded);
                        break;
                    }
                }
                NextPage::NotReady => driver.wait_ready(poll_interval).await,
                NextPage::Finished => break,
            }
        }
    };

    let interrupted = tokio::select! {
        _ = crawl => false,
        _ = tokio::signal::ctrl_c() => true,
    };

    driver.stop();

    if interrupted {
        tracing::warn!("Interrupted, stopping workers");
        pool.kill();
    } else {
        tracing::info!("Crawl finished, waiting for extraction to drain");
        pool.finish().await;
    }

    print_statistics(&stats.snapshot());
    Ok(())
}
