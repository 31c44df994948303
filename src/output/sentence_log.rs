//! Append-only sentence log
//!
//! Every extraction worker owns one log file. Lines are UTF-8 and look like
//! `{title} - {sentence}`.

use crate::Result;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Formats one output line, including the trailing newline
pub fn format_line(title: &str, sentence: &str) -> String {
    format!("{} - {}\n", title, sentence)
}

/// A per-worker output file
#[derive(Debug, Clone)]
pub struct SentenceLog {
    path: PathBuf,
}

impl SentenceLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log for worker `worker_id` inside `directory` (`w{worker_id}.txt`)
    pub fn for_worker(directory: &Path, worker_id: usize) -> Self {
        Self::new(directory.join(format!("w{}.txt", worker_id)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line per sentence; the file is created on first use
    ///
    /// Nothing is written (and no file created) when `sentences` is empty.
    pub async fn append(&self, title: &str, sentences: &[String]) -> Result<()> {
        if sentences.is_empty() {
            return Ok(());
        }

        let buffer: String = sentences
            .iter()
            .map(|sentence| format_line(title, sentence))
            .collect();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(buffer.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
