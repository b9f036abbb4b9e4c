//! Stacked-predicate scan
//!
//! Callers push `(schema template, predicate)` pairs and register a result
//! consumer. A run drains the pairs, finds the table each template resolves
//! to, and collects accepted records into one set, so a record accepted by
//! several predicates is reported once. A run that cannot resolve every
//! template consumes nothing.
//!
//! Runs are single-threaded. Only one run may be in progress per scan.

use crate::partitioned::Predicate;
use formdb_core::{FormError, Record, Result};
use formdb_storage::Database;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Consumer of a stacked scan's deduplicated matches
pub type ResultCallback = Arc<dyn Fn(FxHashSet<Record>) + Send + Sync>;

/// Stack of per-shape predicates
#[derive(Default)]
pub struct StackedScan {
    pending: Mutex<Vec<(Record, Predicate)>>,
    on_result: Mutex<Option<ResultCallback>>,
    searching: AtomicBool,
}

impl StackedScan {
    /// Empty scan
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a predicate for the table `schema` resolves to
    ///
    /// A schema carrying an origin table name is routed by that name,
    /// otherwise by shape.
    pub fn add_type_column(&self, schema: Record, predicate: Predicate) -> &Self {
        self.pending.lock().push((schema, predicate));
        self
    }

    /// Register the result consumer, replacing any previous one
    pub fn get_result<F>(&self, on_result: F) -> &Self
    where
        F: Fn(FxHashSet<Record>) + Send + Sync + 'static,
    {
        *self.on_result.lock() = Some(Arc::new(on_result));
        self
    }

    /// Number of pairs not yet consumed
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether a run is in progress
    pub fn is_searching(&self) -> bool {
        self.searching.load(Ordering::Acquire)
    }

    /// Consume every pushed pair and deliver the matches
    ///
    /// Fails with `MissingCallback` when no consumer is registered (nothing
    /// is consumed) and with `ScanInProgress` when another run is active.
    /// Returns the number of records delivered.
    pub fn run(&self, database: &Database) -> Result<usize> {
        let Some(on_result) = self.on_result.lock().clone() else {
            tracing::warn!(target: "formdb::query", pending = self.pending(), "stacked scan has no result callback");
            return Err(FormError::MissingCallback);
        };
        let found = self.search(database)?;
        let count = found.len();
        on_result(found);
        Ok(count)
    }

    /// Consume every pushed pair and return the matches
    ///
    /// Every template is resolved before any predicate runs. When one fails
    /// to resolve, the pairs go back on the stack and nothing is consumed.
    pub fn search(&self, database: &Database) -> Result<FxHashSet<Record>> {
        let _searching = SearchGuard::acquire(&self.searching)?;
        let pairs = std::mem::take(&mut *self.pending.lock());

        let resolved: Result<Vec<_>> = pairs
            .iter()
            .rev()
            .map(|(schema, _)| database.resolve_table(schema))
            .collect();
        let tables = match resolved {
            Ok(tables) => tables,
            Err(e) => {
                tracing::warn!(target: "formdb::query", db = %database.name(), error = %e, "stacked scan left unconsumed");
                self.restore(pairs);
                return Err(e);
            }
        };

        let mut found = FxHashSet::default();
        for ((schema, predicate), table) in pairs.iter().rev().zip(tables) {
            let Some(table) = table else {
                tracing::debug!(
                    target: "formdb::query",
                    db = %database.name(),
                    shape = %schema.type_string(),
                    "no table for stacked predicate"
                );
                continue;
            };
            let before = found.len();
            found.extend(table.cursor().filter(|r| predicate(*r)).cloned());
            tracing::debug!(
                target: "formdb::query",
                table = %table.name(),
                added = found.len() - before,
                "stacked predicate applied"
            );
        }
        Ok(found)
    }

    /// Put drained pairs back beneath anything pushed since
    fn restore(&self, pairs: Vec<(Record, Predicate)>) {
        let mut pending = self.pending.lock();
        let newer = std::mem::replace(&mut *pending, pairs);
        pending.extend(newer);
    }
}

impl fmt::Debug for StackedScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackedScan")
            .field("pending", &self.pending())
            .field("has_callback", &self.on_result.lock().is_some())
            .field("searching", &self.is_searching())
            .finish()
    }
}

struct SearchGuard<'a>(&'a AtomicBool);

impl<'a> SearchGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| FormError::ScanInProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for SearchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
