//! Database: a named set of tables
//!
//! Tables are keyed by name. A name is bound to exactly one shape; putting a
//! table with a bound name and the same shape merges it, putting one with a
//! bound name and another shape is a `NameConflict`.
//!
//! # Resolution
//!
//! A record is routed to a table either by name (its own `origin_table`
//! hint or an explicit hint) or by shape. Shape resolution never guesses:
//! when several tables share the record's TypeHash the caller gets
//! `AmbiguousShape` and must supply a name.

use crate::callback::{CallbackSlot, SharedCallback};
use crate::table::Table;
use formdb_core::{FormError, Record, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Outcome of [`Database::put_table`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TablePut {
    /// The table was new and has been added
    Inserted,
    /// An equal table existed; this many records were copied into it
    Merged(usize),
}

/// A named collection of tables
#[derive(Clone, Serialize, Deserialize)]
pub struct Database {
    name: String,
    tables: BTreeMap<String, Table>,
    #[serde(skip)]
    callback: CallbackSlot,
}

impl Database {
    /// Create an empty database
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: BTreeMap::new(),
            callback: CallbackSlot::default(),
        }
    }

    /// Create a database with one empty table per `(schema, table name)` pair
    pub fn with_schemas<'a>(
        name: impl Into<String>,
        schemas: impl IntoIterator<Item = (Record, &'a str)>,
    ) -> Result<Self> {
        let mut db = Self::new(name);
        for (schema, table_name) in schemas {
            db.put_table(Table::new(schema, table_name))?;
        }
        Ok(db)
    }

    /// Create a database from existing tables, merging equal ones
    pub fn with_tables(name: impl Into<String>, tables: impl IntoIterator<Item = Table>) -> Result<Self> {
        let mut db = Self::new(name);
        for table in tables {
            db.put_table(table)?;
        }
        Ok(db)
    }

    /// Database name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check for no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total records across all tables
    pub fn record_count(&self) -> usize {
        self.tables.values().map(Table::len).sum()
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Mutable table lookup by name
    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    /// Iterate over tables in name order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Table names in order
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// All tables whose schema has the given TypeHash
    pub fn tables_with_shape(&self, type_hash: u64) -> Vec<&Table> {
        self.tables
            .values()
            .filter(|t| t.type_hash() == type_hash)
            .collect()
    }

    /// Find the table a record belongs to
    ///
    /// The record's `origin_table` hint wins when it names a table of the
    /// right shape. Otherwise the unique table with the record's TypeHash is
    /// returned; several candidates yield `AmbiguousShape`.
    pub fn resolve_table(&self, record: &Record) -> Result<Option<&Table>> {
        if let Some(hint) = record.origin_table() {
            if let Some(table) = self.tables.get(hint) {
                if table.accepts(record) {
                    return Ok(Some(table));
                }
            }
        }
        self.resolve_by_shape(record.type_hash())
    }

    /// Find the unique table with the given TypeHash
    pub fn resolve_by_shape(&self, type_hash: u64) -> Result<Option<&Table>> {
        let candidates = self.tables_with_shape(type_hash);
        match candidates.len() {
            0 => Ok(None),
            1 => Ok(candidates.into_iter().next()),
            _ => Err(FormError::AmbiguousShape {
                type_hash,
                candidates: candidates.iter().map(|t| t.name().to_string()).collect(),
            }),
        }
    }

    /// Add a table, merging into an equal existing one
    pub fn put_table(&mut self, table: Table) -> Result<TablePut> {
        let cb = self.callback.get();
        match self.tables.get_mut(table.name()) {
            None => {
                let mut table = table;
                table.unity_callback(cb.clone());
                let name = table.name().to_string();
                self.tables.insert(name.clone(), table);
                tracing::debug!(target: "formdb::storage", db = %self.name, table = %name, "put table");
                if let (Some(cb), Some(table)) = (cb, self.tables.get(&name)) {
                    cb.put_table(self, table)?;
                }
                Ok(TablePut::Inserted)
            }
            Some(existing) if *existing == table => {
                let count = existing.merge_from(&table)?;
                tracing::warn!(
                    target: "formdb::storage",
                    db = %self.name,
                    table = %table.name(),
                    merged = count,
                    "table already present, merged contents"
                );
                Ok(TablePut::Merged(count))
            }
            Some(existing) => {
                tracing::warn!(
                    target: "formdb::storage",
                    db = %self.name,
                    table = %table.name(),
                    bound = %existing.schema().type_string(),
                    incoming = %table.schema().type_string(),
                    "table name already bound to another shape"
                );
                Err(FormError::NameConflict(format!(
                    "table '{}' already exists with a different schema",
                    table.name()
                )))
            }
        }
    }

    /// Route a record into a table by name
    ///
    /// The target name is `name_hint`, falling back to the record's own
    /// `origin_table`. An existing table receives the record through
    /// [`Table::put`]; otherwise a new table is created with the record as
    /// both schema and first member.
    pub fn put_record(&mut self, record: Record, name_hint: Option<&str>) -> Result<()> {
        let name = match name_hint.or(record.origin_table()) {
            Some(name) => name.to_string(),
            None => {
                tracing::warn!(target: "formdb::storage", db = %self.name, record = %record, "no table name for record");
                return Err(FormError::NameConflict(
                    "put_record needs a table name hint or a record origin table".to_string(),
                ));
            }
        };
        let cb = self.callback.get();

        if let Some(table) = self.tables.get_mut(&name) {
            let observed = cb.as_ref().map(|_| record.clone());
            table.put(record)?;
            if let (Some(cb), Some(record)) = (cb, observed) {
                cb.put_table_by_column(self, &record, &name)?;
            }
            return Ok(());
        }

        let observed = cb.as_ref().map(|_| record.clone());
        let mut table = Table::new(record, name.clone());
        table.unity_callback(cb.clone());
        self.tables.insert(name.clone(), table);
        tracing::debug!(target: "formdb::storage", db = %self.name, table = %name, "created table from record");
        if let Some(table) = self.tables.get_mut(&name) {
            table.add_type_column()?;
        }

        if let (Some(cb), Some(record)) = (cb, observed) {
            if let Some(table) = self.tables.get(&name) {
                cb.put_table(self, table)?;
            }
            cb.put_table_by_column(self, &record, &name)?;
        }
        Ok(())
    }

    /// Remove a table equal to `table` (same name and shape)
    pub fn delete_table(&mut self, table: &Table) -> Result<Table> {
        match self.tables.get(table.name()) {
            Some(existing) if existing == table => {}
            _ => {
                return Err(FormError::NotFound {
                    table: table.name().to_string(),
                })
            }
        }
        let removed = match self.tables.remove(table.name()) {
            Some(removed) => removed,
            None => {
                return Err(FormError::NotFound {
                    table: table.name().to_string(),
                })
            }
        };
        tracing::debug!(target: "formdb::storage", db = %self.name, table = %removed.name(), "deleted table");
        if let Some(cb) = self.callback.get() {
            cb.delete_table(self, &removed)?;
        }
        Ok(removed)
    }

    /// Remove a record from the table it resolves to
    ///
    /// Uses the record's `origin_table` hint first, then its shape.
    pub fn delete_record(&mut self, record: &Record) -> Result<()> {
        let name = match record.origin_table().filter(|n| self.tables.contains_key(*n)) {
            Some(name) => name.to_string(),
            None => match self.resolve_by_shape(record.type_hash())? {
                Some(table) => table.name().to_string(),
                None => {
                    return Err(FormError::NotFound {
                        table: record
                            .origin_table()
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("<shape {:#018x}>", record.type_hash())),
                    })
                }
            },
        };
        match self.tables.get_mut(&name) {
            Some(table) => table.delete(record),
            None => Err(FormError::NotFound { table: name }),
        }
    }

    /// Merge every table of `other` into this database
    ///
    /// Returns the number of tables that were new. Conflicting names are
    /// reported and skipped; the remaining tables are still merged.
    pub fn merge(&mut self, other: Database) -> Result<usize> {
        let mut inserted = 0;
        for (_, table) in other.tables {
            match self.put_table(table) {
                Ok(TablePut::Inserted) => inserted += 1,
                Ok(TablePut::Merged(_)) => {}
                Err(e @ FormError::NameConflict(_)) => {
                    tracing::warn!(target: "formdb::storage", db = %self.name, error = %e, "skipped table during merge");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(inserted)
    }

    /// Attach a callback to the database only, warning if one was set
    pub fn add_callback(&mut self, callback: SharedCallback) {
        if self.callback.replace(Some(callback)) {
            tracing::warn!(target: "formdb::storage", db = %self.name, "replacing existing database callback");
        }
    }

    /// Set the callback on the database and every table
    pub fn unity_callback(&mut self, callback: Option<SharedCallback>) {
        for table in self.tables.values_mut() {
            table.unity_callback(callback.clone());
        }
        self.callback.replace(callback);
    }
}

impl PartialEq for Database {
    /// Same name and, table by table, same contents
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.tables.len() == other.tables.len()
            && self
                .tables
                .iter()
                .zip(other.tables.iter())
                .all(|((ka, a), (kb, b))| ka == kb && a.same_contents(b))
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("tables", &self.tables.values().collect::<Vec<_>>())
            .field("callback", &self.callback)
            .finish()
    }
}
