//! One entry point over both scan strategies

use crate::config::QueryConfig;
use crate::partitioned::{PartitionedScan, Predicate, ScanUnit};
use crate::stacked::StackedScan;
use formdb_core::{Record, Result};
use formdb_engine::{Controller, SharedDatabase};
use std::sync::Arc;

/// How a query is evaluated
pub enum Strategy {
    /// One predicate over every table, spread across a thread pool
    Partitioned {
        /// Task granularity
        unit: ScanUnit,
        /// Filter
        predicate: Predicate,
    },
    /// Per-shape predicates consumed from a stack, deduplicated
    Stacked(Arc<StackedScan>),
}

/// Query front end for a shared database
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    partitioned: PartitionedScan,
}

impl QueryEngine {
    /// Engine with the given options
    pub fn new(config: QueryConfig) -> Self {
        Self {
            partitioned: PartitionedScan::new(config),
        }
    }

    /// Partitioned scanner used by [`Strategy::Partitioned`]
    pub fn partitioned(&self) -> &PartitionedScan {
        &self.partitioned
    }

    /// Evaluate `strategy` against `database`
    ///
    /// A stacked strategy reads the database under one read lock and
    /// returns its matches directly instead of calling the scan's result
    /// callback.
    pub fn execute(&self, database: &SharedDatabase, strategy: Strategy) -> Result<Vec<Record>> {
        match strategy {
            Strategy::Partitioned { unit, predicate } => {
                self.partitioned.sync_result(database, predicate, unit)
            }
            Strategy::Stacked(scan) => match database.read().as_ref() {
                Some(db) => Ok(scan.search(db)?.into_iter().collect()),
                None => Ok(Vec::new()),
            },
        }
    }

    /// [`QueryEngine::execute`] against a controller's database
    pub fn execute_on(&self, controller: &Controller, strategy: Strategy) -> Result<Vec<Record>> {
        self.execute(&controller.database_handle(), strategy)
    }
}
