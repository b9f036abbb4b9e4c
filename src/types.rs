//! Public types for the FormDB API.
//!
//! This module re-exports types from the internal crates with one flat
//! public interface.

// ============================================================================
// Data model
// ============================================================================

// Typed atoms and values
pub use formdb_core::{Unit, UnitType, Value};

// Records and their structural hashing
pub use formdb_core::{structural_hash, Record};

// Schema-compiler contract
pub use formdb_core::{schema_from_fields, Entity, FieldSpec};

// Errors
pub use formdb_core::{FormError, Result};

// ============================================================================
// Store
// ============================================================================

pub use formdb_storage::{Database, Table, TableCursor, TablePut};

// Mutation observers
pub use formdb_storage::{FormCallback, NoopCallback, SharedCallback};

// Lifecycle
pub use formdb_engine::{Controller, ControllerConfig, SharedDatabase};

// ============================================================================
// Queries
// ============================================================================

pub use formdb_query::{
    predicate, PartitionedScan, Predicate, QueryConfig, QueryEngine, ResultCallback, ScanUnit,
    StackedScan, Strategy,
};
