//! Sentence extraction pipeline
//!
//! Documents yielded by the crawl are pushed onto an [`ExtractionQueue`];
//! an [`ExtractionPool`] of workers drains it, keeps the sentences that
//! match the language's [`SentenceFilter`], and appends them to per-worker
//! output files.

mod pool;
mod queue;
mod sentences;

pub use pool::{find_sentences, ExtractionPool};
pub use queue::{ExtractionJob, ExtractionQueue};
pub use sentences::{language_pattern, normalize_whitespace, SentenceFilter};
