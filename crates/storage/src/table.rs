//! Table: a schema record plus the records sharing its shape
//!
//! # Invariant
//!
//! Every member has the same TypeHash as the schema. `put` is the only way
//! in, and it rejects records of any other shape.
//!
//! # Identity
//!
//! Two tables are equal when they have the same name and the same schema
//! TypeHash. Tables sharing a shape under different names are distinct.
//!
//! # Iteration
//!
//! [`Table::cursor`] hands out a fresh cursor per call. There is no shared
//! cursor state on the table, so any number of readers may walk it at once.

use crate::callback::{CallbackSlot, SharedCallback};
use formdb_core::{FormError, Record, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::hash_set;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::Peekable;

/// A named set of records sharing one schema
#[derive(Clone, Serialize, Deserialize)]
pub struct Table {
    name: String,
    schema: Record,
    members: FxHashSet<Record>,
    #[serde(skip)]
    callback: CallbackSlot,
}

impl Table {
    /// Create an empty table for `schema`
    ///
    /// The schema is only a type template; it is not stored as a member
    /// unless [`Table::add_type_column`] is called.
    pub fn new(schema: Record, name: impl Into<String>) -> Self {
        let mut schema = schema;
        schema.clear_origin_table();
        Self {
            name: name.into(),
            schema,
            members: FxHashSet::default(),
            callback: CallbackSlot::default(),
        }
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema template
    pub fn schema(&self) -> &Record {
        &self.schema
    }

    /// TypeHash shared by every member
    pub fn type_hash(&self) -> u64 {
        self.schema.type_hash()
    }

    /// Whether `record` has this table's shape
    pub fn accepts(&self, record: &Record) -> bool {
        record.type_hash() == self.type_hash()
    }

    /// Number of member records
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check for no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Membership by full-value equality
    pub fn contains(&self, record: &Record) -> bool {
        self.members.contains(record)
    }

    /// Insert a record
    ///
    /// Fails with `SchemaMismatch` when the shape differs and with
    /// `DuplicateEntry` when an equal record is already a member. In both
    /// cases the table is unchanged.
    pub fn put(&mut self, record: Record) -> Result<()> {
        self.check_shape(&record)?;
        if self.members.contains(&record) {
            tracing::warn!(
                target: "formdb::storage",
                table = %self.name,
                record = %record,
                "record already present"
            );
            return Err(FormError::duplicate(format!("table '{}'", self.name)));
        }

        let mut record = record;
        record.clear_origin_table();
        let observed = self.callback.get().map(|cb| (cb, record.clone()));
        self.members.insert(record);
        tracing::debug!(target: "formdb::storage", table = %self.name, len = self.members.len(), "put record");

        if let Some((cb, record)) = observed {
            cb.put_column(self, &record)?;
        }
        Ok(())
    }

    /// Remove a record
    ///
    /// Fails with `SchemaMismatch` when the shape differs and with
    /// `NotFound` when the record is not a member.
    pub fn delete(&mut self, record: &Record) -> Result<()> {
        self.check_shape(record)?;
        if !self.members.remove(record) {
            tracing::warn!(
                target: "formdb::storage",
                table = %self.name,
                record = %record,
                "record not present"
            );
            return Err(FormError::NotFound {
                table: self.name.clone(),
            });
        }
        tracing::debug!(target: "formdb::storage", table = %self.name, len = self.members.len(), "deleted record");

        if let Some(cb) = self.callback.get() {
            cb.delete_column(self, record)?;
        }
        Ok(())
    }

    /// Insert the schema record itself as a member
    pub fn add_type_column(&mut self) -> Result<()> {
        let schema = self.schema.clone();
        self.put(schema)
    }

    /// Copy in every member of `other` not already present
    ///
    /// Returns the number of records copied. Records of another shape are
    /// skipped (they cannot exist in a table equal to this one).
    pub fn merge_from(&mut self, other: &Table) -> Result<usize> {
        let mut count = 0;
        for record in other.cursor() {
            if self.accepts(record) && !self.members.contains(record) {
                self.put(record.clone())?;
                count += 1;
            }
        }
        Ok(count)
    }

    /// Fresh cursor over the current members
    pub fn cursor(&self) -> TableCursor<'_> {
        TableCursor {
            inner: self.members.iter().peekable(),
        }
    }

    /// Iterate over members
    pub fn iter(&self) -> hash_set::Iter<'_, Record> {
        self.members.iter()
    }

    /// Same name, shape and member set
    pub fn same_contents(&self, other: &Table) -> bool {
        self == other && self.schema == other.schema && self.members == other.members
    }

    /// Attach a callback, warning if one was already set
    pub fn add_callback(&mut self, callback: SharedCallback) {
        if self.callback.replace(Some(callback)) {
            tracing::warn!(target: "formdb::storage", table = %self.name, "replacing existing table callback");
        }
    }

    /// Set or clear the callback without warning
    pub fn unity_callback(&mut self, callback: Option<SharedCallback>) {
        self.callback.replace(callback);
    }

    fn check_shape(&self, record: &Record) -> Result<()> {
        if self.accepts(record) {
            return Ok(());
        }
        tracing::warn!(
            target: "formdb::storage",
            table = %self.name,
            expected = %self.schema.type_string(),
            found = %record.type_string(),
            "record shape does not match table schema"
        );
        Err(FormError::SchemaMismatch {
            table: self.name.clone(),
            expected: self.type_hash(),
            found: record.type_hash(),
        })
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.type_hash() == other.type_hash() && self.name == other.name
    }
}

impl Eq for Table {}

impl Hash for Table {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.type_hash());
        self.name.hash(state);
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("schema", &self.schema.type_string())
            .field("len", &self.members.len())
            .field("callback", &self.callback)
            .finish()
    }
}

/// Cursor over a table's members
///
/// Borrowing the table keeps it immutable for the cursor's lifetime.
pub struct TableCursor<'a> {
    inner: Peekable<hash_set::Iter<'a, Record>>,
}

impl<'a> TableCursor<'a> {
    /// Check whether another record is available
    pub fn has_next(&mut self) -> bool {
        self.inner.peek().is_some()
    }
}

impl<'a> Iterator for TableCursor<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
