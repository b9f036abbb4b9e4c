//! Pool-partitioned scan
//!
//! A predicate is evaluated against every stored record by a set of tasks
//! running on a thread pool built for the one invocation.
//!
//! # Units
//!
//! - [`ScanUnit::Table`]: one task per table. Each task takes a read lock on
//!   the database and walks its table through a private cursor.
//! - [`ScanUnit::Column`]: each table's members are copied out in contiguous
//!   chunks of `len / partitions + 1` records, one task per chunk. No lock
//!   is held while chunks are scanned.
//!
//! Matches are appended to one shared result list. Result order is
//! unspecified.
//!
//! # Waiting
//!
//! The caller (or, for [`PartitionedScan::async_result`], one monitor
//! thread) waits up to the configured bound. Tasks still running when the
//! bound elapses are not cancelled; the scan reports `QueryTimeout`.

use crate::config::QueryConfig;
use crate::latch::Latch;
use formdb_core::{FormError, Record, Result};
use formdb_engine::SharedDatabase;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Record filter shared across scan tasks
pub type Predicate = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

/// Wrap a closure as a [`Predicate`]
pub fn predicate<F>(f: F) -> Predicate
where
    F: Fn(&Record) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Granularity of scan tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanUnit {
    /// One task per table
    Table,
    /// One task per chunk of records
    Column,
}

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Dispatched scan awaiting completion
struct Dispatch {
    pool: Option<rayon::ThreadPool>,
    latch: Arc<Latch>,
    results: Arc<Mutex<Vec<Record>>>,
    tasks: usize,
    started: Instant,
}

impl Dispatch {
    fn wait(self, bound: Duration) -> Result<Vec<Record>> {
        let finished = self.latch.wait_for(bound);
        // Dropping the pool lets running tasks finish in the background
        drop(self.pool);

        if !finished {
            tracing::warn!(
                target: "formdb::query",
                tasks = self.tasks,
                bound_ms = bound.as_millis() as u64,
                "scan exceeded wait bound"
            );
            return Err(FormError::QueryTimeout(bound));
        }
        if self.latch.panicked() {
            return Err(FormError::ScanFailed("a scan task panicked".to_string()));
        }

        let results = std::mem::take(&mut *self.results.lock());
        tracing::debug!(
            target: "formdb::query",
            tasks = self.tasks,
            matches = results.len(),
            elapsed_us = self.started.elapsed().as_micros() as u64,
            "scan complete"
        );
        Ok(results)
    }
}

/// Thread-pool scan over a shared database
#[derive(Debug, Clone, Default)]
pub struct PartitionedScan {
    config: QueryConfig,
}

impl PartitionedScan {
    /// Scan with the given options
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    /// Options in effect
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Run the scan and block until it completes or times out
    pub fn sync_result(
        &self,
        database: &SharedDatabase,
        predicate: Predicate,
        unit: ScanUnit,
    ) -> Result<Vec<Record>> {
        self.dispatch(database, predicate, unit)?
            .wait(self.config.wait_bound)
    }

    /// Run the scan without blocking
    ///
    /// `on_result` is called once, from a monitor thread, with the matches
    /// or the error that ended the scan.
    pub fn async_result<F>(
        &self,
        database: &SharedDatabase,
        predicate: Predicate,
        unit: ScanUnit,
        on_result: F,
    ) -> Result<JoinHandle<()>>
    where
        F: FnOnce(Result<Vec<Record>>) + Send + 'static,
    {
        let dispatch = self.dispatch(database, predicate, unit)?;
        let bound = self.config.wait_bound;
        std::thread::Builder::new()
            .name("formdb-scan-monitor".to_string())
            .spawn(move || on_result(dispatch.wait(bound)))
            .map_err(|e| FormError::ScanFailed(format!("cannot start monitor thread: {e}")))
    }

    fn dispatch(
        &self,
        database: &SharedDatabase,
        predicate: Predicate,
        unit: ScanUnit,
    ) -> Result<Dispatch> {
        let results = Arc::new(Mutex::new(Vec::new()));
        let tasks = match unit {
            ScanUnit::Table => table_tasks(database, &predicate, &results),
            ScanUnit::Column => {
                column_tasks(database, &predicate, &results, self.config.effective_partitions())
            }
        };

        let latch = Latch::new(tasks.len());
        let count = tasks.len();
        tracing::debug!(target: "formdb::query", ?unit, tasks = count, "dispatching scan");

        let pool = if tasks.is_empty() {
            None
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(count)
                .thread_name(|i| format!("formdb-scan-{i}"))
                .panic_handler(|_| {
                    tracing::error!(target: "formdb::query", "scan task panicked");
                })
                .build()
                .map_err(|e| FormError::ScanFailed(format!("cannot build scan pool: {e}")))?;
            for task in tasks {
                let guard = latch.task();
                pool.spawn(move || {
                    let _guard = guard;
                    task();
                });
            }
            Some(pool)
        };

        Ok(Dispatch {
            pool,
            latch,
            results,
            tasks: count,
            started: Instant::now(),
        })
    }
}

fn table_tasks(
    database: &SharedDatabase,
    predicate: &Predicate,
    results: &Arc<Mutex<Vec<Record>>>,
) -> Vec<Task> {
    let names = match database.read().as_ref() {
        Some(db) => db.table_names(),
        None => return Vec::new(),
    };

    names
        .into_iter()
        .map(|name| {
            let database = Arc::clone(database);
            let predicate = Arc::clone(predicate);
            let results = Arc::clone(results);
            Box::new(move || {
                let guard = database.read();
                let Some(table) = guard.as_ref().and_then(|db| db.table(&name)) else {
                    return;
                };
                let matches: Vec<Record> = table.cursor().filter(|r| predicate(*r)).cloned().collect();
                if !matches.is_empty() {
                    results.lock().extend(matches);
                }
            }) as Task
        })
        .collect()
}

fn column_tasks(
    database: &SharedDatabase,
    predicate: &Predicate,
    results: &Arc<Mutex<Vec<Record>>>,
    partitions: usize,
) -> Vec<Task> {
    let chunks = {
        let guard = database.read();
        let Some(db) = guard.as_ref() else {
            return Vec::new();
        };
        let mut chunks = Vec::new();
        for table in db.tables() {
            chunks.extend(chunk_records(table.iter(), table.len(), partitions));
        }
        chunks
    };

    chunks
        .into_iter()
        .map(|chunk| {
            let predicate = Arc::clone(predicate);
            let results = Arc::clone(results);
            Box::new(move || {
                let matches: Vec<Record> = chunk.into_iter().filter(|r| predicate(r)).collect();
                if !matches.is_empty() {
                    results.lock().extend(matches);
                }
            }) as Task
        })
        .collect()
}

/// Split `len` records into contiguous chunks of `len / partitions + 1`
fn chunk_records<'a>(
    records: impl Iterator<Item = &'a Record>,
    len: usize,
    partitions: usize,
) -> Vec<Vec<Record>> {
    let chunk_size = len / partitions.max(1) + 1;
    let mut chunks = Vec::new();
    let mut chunk = Vec::with_capacity(chunk_size);
    for record in records {
        chunk.push(record.clone());
        if chunk.len() == chunk_size {
            chunks.push(std::mem::replace(&mut chunk, Vec::with_capacity(chunk_size)));
        }
    }
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
    chunks
}
