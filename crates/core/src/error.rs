//! Error types for FormDB
//!
//! Two classes of failure exist:
//!
//! - **Local**: shape, duplicate and naming violations. The operation was a
//!   no-op and the store is unchanged; callers may continue.
//! - **Fatal**: persistence, timeout and programmer errors. These abort the
//!   caller's chain of operations.
//!
//! | Condition | Variant | Class |
//! |-----------|---------|-------|
//! | Record shape differs from table schema | `SchemaMismatch` | local |
//! | Unit slot or record already present | `DuplicateEntry` | local |
//! | Record not a member on delete | `NotFound` | local |
//! | Name bound to another shape, or no name supplied | `NameConflict` | local |
//! | Several tables share a shape and no hint given | `AmbiguousShape` | local |
//! | Value does not fit the declared unit type | `TypeMismatch` | local |
//! | Callback hook returned an error | `Callback` | local |
//! | File delete/read/write failed | `PersistenceFailure` | fatal |
//! | Scan exceeded its wait bound | `QueryTimeout` | fatal |
//! | Deleting the sole database | `UnsupportedOperation` | fatal |
//! | Stacked scan with no result consumer | `MissingCallback` | fatal |
//! | Overlapping stacked scans | `ScanInProgress` | fatal |

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for FormDB operations
pub type Result<T> = std::result::Result<T, FormError>;

/// All errors surfaced by FormDB
#[derive(Debug, Error)]
pub enum FormError {
    /// Record shape (TypeHash) does not match the table schema
    #[error("schema mismatch on table '{table}': expected type hash {expected:#018x}, got {found:#018x}")]
    SchemaMismatch {
        /// Table the record was routed to
        table: String,
        /// TypeHash of the table schema
        expected: u64,
        /// TypeHash of the offending record
        found: u64,
    },

    /// A unit slot or a record is already present
    #[error("duplicate entry in {context}")]
    DuplicateEntry {
        /// Where the duplicate was detected
        context: String,
    },

    /// Record is not a member of the table it was routed to
    #[error("record not found in table '{table}'")]
    NotFound {
        /// Table that was searched
        table: String,
    },

    /// Name already bound, or a required name was absent
    #[error("name conflict: {0}")]
    NameConflict(String),

    /// Several tables share the record's shape and no name hint resolves it
    #[error("type hash {type_hash:#018x} matches several tables {candidates:?}; supply a table name hint")]
    AmbiguousShape {
        /// Shared TypeHash
        type_hash: u64,
        /// Names of every matching table
        candidates: Vec<String>,
    },

    /// Value does not fit the unit's declared type
    #[error("unit '{name}' declared as {expected} but value is {found}")]
    TypeMismatch {
        /// Unit name
        name: String,
        /// Declared type
        expected: String,
        /// Type of the supplied value
        found: String,
    },

    /// A callback hook failed after the mutation took effect
    #[error("callback failed: {0}")]
    Callback(String),

    /// File delete/read/write failure during load or save
    #[error("persistence failure at {path}: {reason}")]
    PersistenceFailure {
        /// File involved
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// Scan tasks did not finish inside the wait bound
    #[error("query did not complete within {0:?}")]
    QueryTimeout(Duration),

    /// Operation is not permitted on this object
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Stacked scan finished with no registered result consumer
    #[error("no result callback registered for stacked scan")]
    MissingCallback,

    /// A stacked scan is already running on this engine
    #[error("a stacked scan is already in progress")]
    ScanInProgress,

    /// Scan workers could not be started or a scan task panicked
    #[error("scan failed: {0}")]
    ScanFailed(String),
}

impl FormError {
    /// Build a persistence failure from any displayable cause
    pub fn persistence(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        FormError::PersistenceFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a duplicate-entry error
    pub fn duplicate(context: impl Into<String>) -> Self {
        FormError::DuplicateEntry {
            context: context.into(),
        }
    }

    /// True for errors that must abort the caller
    ///
    /// Local errors leave the store unchanged and are safe to ignore.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FormError::PersistenceFailure { .. }
                | FormError::QueryTimeout(_)
                | FormError::UnsupportedOperation(_)
                | FormError::MissingCallback
                | FormError::ScanInProgress
                | FormError::ScanFailed(_)
        )
    }
}
