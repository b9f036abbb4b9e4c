//! Query layer for FormDB
//!
//! This crate scans a controller's database with caller-supplied
//! predicates:
//! - PartitionedScan: per-table or per-chunk tasks on a thread pool, with
//!   a bounded wait and synchronous or asynchronous delivery
//! - StackedScan: per-shape predicates popped from a stack, deduplicated
//! - QueryEngine: one `execute` entry point over both

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
mod latch;
pub mod partitioned;
pub mod stacked;

pub use config::{QueryConfig, DEFAULT_WAIT_BOUND};
pub use engine::{QueryEngine, Strategy};
pub use partitioned::{predicate, PartitionedScan, Predicate, ScanUnit};
pub use stacked::{ResultCallback, StackedScan};
