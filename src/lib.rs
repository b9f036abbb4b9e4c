//! FormDB: an embedded record store with schema-by-example typing
//!
//! Records are sets of named, typed units. A record's primary units define
//! its shape, and a table holds records of exactly one shape. A
//! [`Controller`] owns one database, persists it to a single file, and
//! hands it to the query layer for concurrent predicate scans.
//!
//! # Quick start
//!
//! ```no_run
//! use formdb::{predicate, Controller, ControllerConfig, QueryEngine, Record, ScanUnit, Strategy, UnitType};
//!
//! # fn main() -> formdb::Result<()> {
//! let controller = Controller::open(ControllerConfig::folder("/tmp/school"))?;
//!
//! let mut db = formdb::Database::new("school");
//! let ann = Record::new()
//!     .with_primary("id", UnitType::Int, 1)?
//!     .with_normal("name", UnitType::String, "Ann")?;
//! db.put_record(ann, Some("Student"))?;
//! controller.put(db)?;
//! controller.save_all()?;
//!
//! let found = QueryEngine::default().execute_on(
//!     &controller,
//!     Strategy::Partitioned {
//!         unit: ScanUnit::Table,
//!         predicate: predicate(|r| r.value("name").and_then(|v| v.as_str()) == Some("Ann")),
//!     },
//! )?;
//! assert_eq!(found.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Crates
//!
//! - `formdb-core`: units, values, records, errors, the `Entity` contract
//! - `formdb-storage`: tables, databases, callbacks
//! - `formdb-engine`: controller, configuration, persistence
//! - `formdb-query`: partitioned and stacked scans

#![warn(missing_docs)]
#![warn(clippy::all)]

mod types;

pub use types::*;

/// Internal crates, for callers that need their module paths
pub mod internals {
    pub use formdb_core as core;
    pub use formdb_engine as engine;
    pub use formdb_query as query;
    pub use formdb_storage as storage;
}
