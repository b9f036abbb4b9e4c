//! Mutation observer
//!
//! A [`FormCallback`] is invoked synchronously at the mutation site, after
//! the structural change has taken effect. Every hook defaults to a no-op,
//! so implementors override only what they need. An error returned from a
//! hook propagates to the caller of the mutating operation; the mutation
//! itself is not rolled back.

use crate::database::Database;
use crate::table::Table;
use formdb_core::{Record, Result};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Observer of store mutations
pub trait FormCallback: Send + Sync {
    /// A record was inserted into `table`
    fn put_column(&self, _table: &Table, _record: &Record) -> Result<()> {
        Ok(())
    }

    /// A record was removed from `table`
    fn delete_column(&self, _table: &Table, _record: &Record) -> Result<()> {
        Ok(())
    }

    /// A table was added to `db`
    fn put_table(&self, _db: &Database, _table: &Table) -> Result<()> {
        Ok(())
    }

    /// A record was routed into `db` by table name
    fn put_table_by_column(&self, _db: &Database, _record: &Record, _name: &str) -> Result<()> {
        Ok(())
    }

    /// A table was removed from `db`
    fn delete_table(&self, _db: &Database, _table: &Table) -> Result<()> {
        Ok(())
    }

    /// A database was adopted or merged by the controller
    fn put_db(&self, _db: &Database) -> Result<()> {
        Ok(())
    }

    /// A database was removed (never happens through the controller)
    fn delete_db(&self, _db: &Database) -> Result<()> {
        Ok(())
    }

    /// The controller finished loading or creating its store at `path`
    fn on_create(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    /// The controller persisted its store to `path`
    fn on_saved(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

/// Shared callback handle
pub type SharedCallback = Arc<dyn FormCallback>;

/// Callback that observes nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCallback;

impl FormCallback for NoopCallback {}

/// Optional callback held by tables and databases
///
/// Never serialized; reattached at runtime after a load.
#[derive(Clone, Default)]
pub struct CallbackSlot(Option<SharedCallback>);

impl CallbackSlot {
    /// Current callback, if any
    pub fn get(&self) -> Option<SharedCallback> {
        self.0.clone()
    }

    /// Replace the callback, returning whether one was already set
    pub fn replace(&mut self, callback: Option<SharedCallback>) -> bool {
        let had = self.0.is_some();
        self.0 = callback;
        had
    }

    /// Check if a callback is attached
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Debug for CallbackSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0.is_some() { "Some(<callback>)" } else { "None" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_replace_reports_previous() {
        let mut slot = CallbackSlot::default();
        assert!(!slot.is_set());
        assert!(!slot.replace(Some(Arc::new(NoopCallback))));
        assert!(slot.is_set());
        assert!(slot.replace(None));
        assert!(slot.get().is_none());
    }

    #[test]
    fn test_debug_hides_callback() {
        let mut slot = CallbackSlot::default();
        slot.replace(Some(Arc::new(NoopCallback)));
        assert_eq!(format!("{:?}", slot), "Some(<callback>)");
    }
}
