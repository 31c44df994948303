//! Extraction worker pool
//!
//! Each worker owns one output log and loops: take a document from the
//! queue, pull its body text, keep the sentences matching the language
//! filter, print them, and append them to its log. Extraction runs on the
//! blocking pool, so a document that fails or panics costs only that
//! document.

use crate::config::ExtractionConfig;
use crate::crawler::DocumentParser;
use crate::extraction::queue::{ExtractionJob, ExtractionQueue};
use crate::extraction::sentences::SentenceFilter;
use crate::output::{CrawlStats, SentenceLog};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Everything a worker shares with its siblings
struct WorkerContext {
    queue: Arc<ExtractionQueue>,
    parser: Arc<dyn DocumentParser>,
    filter: Arc<SentenceFilter>,
    stats: Arc<CrawlStats>,
    poll_interval: Duration,
}

/// Running set of extraction workers
pub struct ExtractionPool {
    queue: Arc<ExtractionQueue>,
    output_directory: PathBuf,
    handles: Vec<JoinHandle<()>>,
    poll_interval: Duration,
}

impl ExtractionPool {
    /// Creates the output directory and spawns `config.workers` workers
    ///
    /// Worker `i` appends to `w{i}.txt` inside the output directory.
    pub fn spawn(
        config: &ExtractionConfig,
        queue: Arc<ExtractionQueue>,
        parser: Arc<dyn DocumentParser>,
        filter: Arc<SentenceFilter>,
        stats: Arc<CrawlStats>,
        poll_interval: Duration,
    ) -> Result<Self> {
        std::fs::create_dir_all(&config.output_directory)?;

        let context = Arc::new(WorkerContext {
            queue: queue.clone(),
            parser,
            filter,
            stats,
            poll_interval,
        });

        let handles = (0..config.workers as usize)
            .map(|worker_id| {
                let log = SentenceLog::for_worker(&config.output_directory, worker_id);
                tokio::spawn(extraction_worker(worker_id, log, context.clone()))
            })
            .collect();

        tracing::info!(
            "Started {} extraction workers writing to {}",
            config.workers,
            config.output_directory.display()
        );

        Ok(Self {
            queue,
            output_directory: config.output_directory.clone(),
            handles,
            poll_interval,
        })
    }

    pub fn queue(&self) -> &Arc<ExtractionQueue> {
        &self.queue
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every queued document to be processed, then stops the workers
    pub async fn finish(self) {
        while !self.queue.is_idle() {
            self.queue.wait_for_release(self.poll_interval).await;
        }
        self.kill();
    }

    /// Stops the workers immediately, abandoning queued and in-progress documents
    pub fn kill(self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

/// Extracts the matching sentences of one document
pub fn find_sentences(
    parser: &dyn DocumentParser,
    filter: &SentenceFilter,
    document: &[u8],
) -> Result<Vec<String>> {
    let html = String::from_utf8_lossy(document);
    let text = parser.extract_body_text(&html)?;
    Ok(filter.matching_sentences(&text))
}

async fn extraction_worker(worker_id: usize, log: SentenceLog, context: Arc<WorkerContext>) {
    tracing::debug!("Extraction worker {} writing to {}", worker_id, log.path().display());

    let mut processed: u64 = 0;
    loop {
        let Some(job) = context.queue.try_pop() else {
            context.queue.wait_for_job(context.poll_interval).await;
            continue;
        };

        processed += 1;
        process_job(worker_id, processed, job, &log, &context).await;
        context.queue.task_done();
    }
}

async fn process_job(
    worker_id: usize,
    processed: u64,
    job: ExtractionJob,
    log: &SentenceLog,
    context: &WorkerContext,
) {
    let ExtractionJob { title, document } = job;

    let parser = context.parser.clone();
    let filter = context.filter.clone();
    let extracted =
        tokio::task::spawn_blocking(move || find_sentences(parser.as_ref(), &filter, &document))
            .await;

    let sentences = match extracted {
        Ok(Ok(sentences)) => sentences,
        Ok(Err(e)) => {
            tracing::warn!("Skipping extraction of '{}': {}", title, e);
            context.stats.record_extraction_failure();
            return;
        }
        Err(e) => {
            tracing::error!("Extraction of '{}' failed: {}", title, e);
            context.stats.record_extraction_failure();
            return;
        }
    };

    println!("{} - {} - {}", worker_id, processed, title);
    for sentence in &sentences {
        println!("{}", sentence);
    }

    if let Err(e) = log.append(&title, &sentences).await {
        tracing::warn!("Failed to write to {}: {}", log.path().display(), e);
    }
    context.stats.record_extraction(sentences.len());
}
