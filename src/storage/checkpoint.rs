//! Checkpoint files
//!
//! Each slot holds one JSON record:
//!
//! ```json
//! {"timestamp": 1700000000.25, "links_to_visit": ["..."], "visited_links": ["..."]}
//! ```
//!
//! Loading reads every slot, ignores the ones that are missing or do not
//! parse, and keeps the record with the largest timestamp.

use crate::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File names of the alternating checkpoint slots
pub const PROGRESS_FILES: [&str; 2] = ["progress1", "progress2"];

/// Immutable snapshot of the crawl frontier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Seconds since the Unix epoch when the snapshot was taken
    pub timestamp: f64,

    /// URLs that were pending or in flight
    pub links_to_visit: Vec<String>,

    /// Every URL dispatched so far
    pub visited_links: Vec<String>,
}

impl Checkpoint {
    /// Creates a checkpoint stamped with the current time
    pub fn new(links_to_visit: Vec<String>, visited_links: Vec<String>) -> Self {
        Self {
            timestamp: Utc::now().timestamp_micros() as f64 / 1_000_000.0,
            links_to_visit,
            visited_links,
        }
    }
}

/// Reads and writes checkpoint slots inside one directory
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    directory: PathBuf,
}

impl CheckpointStore {
    /// Opens a store rooted at `directory`, creating the directory if needed
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn slot_count(&self) -> usize {
        PROGRESS_FILES.len()
    }

    /// Path of the given slot; slot numbers wrap around
    pub fn slot_path(&self, slot: usize) -> PathBuf {
        self.directory
            .join(PROGRESS_FILES[slot % PROGRESS_FILES.len()])
    }

    /// Writes a checkpoint into a slot, replacing what was there
    pub fn save(&self, slot: usize, checkpoint: &Checkpoint) -> Result<()> {
        let bytes = serde_json::to_vec(checkpoint)?;
        fs::write(self.slot_path(slot), bytes)?;
        Ok(())
    }

    /// Reads a single slot
    pub fn load_slot(&self, slot: usize) -> Result<Checkpoint> {
        let bytes = fs::read(self.slot_path(slot))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Returns the freshest readable checkpoint, or `None` for a cold start
    ///
    /// On equal timestamps the lower slot wins.
    pub fn load_latest(&self) -> Option<Checkpoint> {
        let mut newest: Option<Checkpoint> = None;

        for slot in 0..self.slot_count() {
            match self.load_slot(slot) {
                Ok(checkpoint) => {
                    let fresher = newest
                        .as_ref()
                        .map_or(true, |best| checkpoint.timestamp > best.timestamp);
                    if fresher {
                        newest = Some(checkpoint);
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        "Skipping checkpoint {}: {}",
                        self.slot_path(slot).display(),
                        e
                    );
                }
            }
        }

        newest
    }

    /// Deletes every slot; missing files are not an error
    pub fn remove_all(&self) -> Result<()> {
        for slot in 0..self.slot_count() {
            match fs::remove_file(self.slot_path(slot)) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
