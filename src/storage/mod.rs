//! Storage module for persisting crawl progress
//!
//! Progress is kept in two alternating checkpoint files so a crash while one
//! of them is being written never loses both.

mod checkpoint;

pub use checkpoint::{Checkpoint, CheckpointStore, PROGRESS_FILES};
