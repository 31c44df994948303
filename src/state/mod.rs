//! State module for tracking crawl progress
//!
//! The [`Frontier`] is the only shared mutable crawl state. Fetch workers,
//! the checkpoint writer and the crawl driver all go through its operations;
//! none of them touch the underlying collections directly.

mod frontier;

pub use frontier::{CompletedFetch, DequeueOrder, Frontier, FrontierCounts};
