//! Controller configuration
//!
//! Use the builder pattern to configure how a controller opens its store:
//!
//! ```ignore
//! use formdb_engine::ControllerConfig;
//!
//! let config = ControllerConfig::new("/var/lib/app/store.db")
//!     .delete_cache_first(false)
//!     .database_name("school");
//! ```

use formdb_storage::{CallbackSlot, SharedCallback};
use std::path::{Path, PathBuf};

/// File name used for cache and folder stores
pub const DEFAULT_FILE_NAME: &str = "formDB.db";

/// Name given to a database created implicitly by entity accessors
pub const DEFAULT_DATABASE_NAME: &str = "formdb";

/// Default cache location: `<cwd>/target/formDB.db`
pub fn default_cache_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("target")
        .join(DEFAULT_FILE_NAME)
}

/// Options for opening a controller
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Backing file
    pub path: PathBuf,
    /// Delete the backing file before loading, starting empty
    pub delete_cache_first: bool,
    /// Name for a database created on first entity insert
    pub database_name: String,
    /// Callback attached before the store is loaded
    pub callback: CallbackSlot,
}

impl ControllerConfig {
    /// Store backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delete_cache_first: false,
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            callback: CallbackSlot::default(),
        }
    }

    /// Store at the default cache path; `create_new` discards the old cache
    pub fn cache(create_new: bool) -> Self {
        Self::new(default_cache_path()).delete_cache_first(create_new)
    }

    /// Store at `<folder>/formDB.db`
    pub fn folder(folder: impl AsRef<Path>) -> Self {
        Self::new(folder.as_ref().join(DEFAULT_FILE_NAME))
    }

    /// Store at `path`, treating it as a folder when `is_folder` is set
    pub fn at(path: impl AsRef<Path>, is_folder: bool) -> Self {
        if is_folder {
            Self::folder(path)
        } else {
            Self::new(path.as_ref())
        }
    }

    /// Set whether the backing file is deleted before loading
    pub fn delete_cache_first(mut self, delete: bool) -> Self {
        self.delete_cache_first = delete;
        self
    }

    /// Set the implicit database name
    pub fn database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = name.into();
        self
    }

    /// Attach a callback that observes the initial load
    pub fn callback(mut self, callback: SharedCallback) -> Self {
        self.callback.replace(Some(callback));
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::cache(false)
    }
}
