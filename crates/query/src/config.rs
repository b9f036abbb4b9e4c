//! Query configuration

use std::time::Duration;

/// Default time a scan caller waits for its tasks
pub const DEFAULT_WAIT_BOUND: Duration = Duration::from_secs(5 * 60);

/// Options for partitioned scans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// Upper bound on waiting for scan tasks
    pub wait_bound: Duration,
    /// Column-unit partition count; `None` means twice the available parallelism
    pub partitions: Option<usize>,
}

impl QueryConfig {
    /// Default options
    pub fn new() -> Self {
        Self {
            wait_bound: DEFAULT_WAIT_BOUND,
            partitions: None,
        }
    }

    /// Set the wait bound
    pub fn wait_bound(mut self, bound: Duration) -> Self {
        self.wait_bound = bound;
        self
    }

    /// Override the column-unit partition count (clamped to at least 1)
    pub fn partitions(mut self, partitions: usize) -> Self {
        self.partitions = Some(partitions.max(1));
        self
    }

    /// Partition count in effect
    pub fn effective_partitions(&self) -> usize {
        self.partitions.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                * 2
        })
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self::new()
    }
}
