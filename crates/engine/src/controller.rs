//! Controller: owner of the database and its backing file
//!
//! A controller holds at most one [`Database`] behind a shared lock, the
//! path it is persisted to, and the runtime callback.
//!
//! # Lifecycle
//!
//! ```text
//! open (load or create) → put / insert / remove → save_all → drop
//! ```
//!
//! # Design
//!
//! The controller is an ordinary value created with [`Controller::open`].
//! Embedders that want one process-wide store can use
//! [`Controller::get_instance`]; the first caller's arguments win.
//!
//! Callback hooks run while the database lock is held. Table and database
//! hooks run under the controller's write lock, and controller-level hooks
//! under a read lock. A hook must not call into the controller at all,
//! neither to read nor to write.

use crate::config::ControllerConfig;
use crate::persist;
use formdb_core::{Entity, FormError, Result};
use formdb_storage::{CallbackSlot, Database, SharedCallback};
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Database handle shared with scan tasks
pub type SharedDatabase = Arc<RwLock<Option<Database>>>;

static INSTANCE: OnceCell<Arc<Controller>> = OnceCell::new();

struct State {
    path: PathBuf,
    callback: CallbackSlot,
    loaded_from_file: bool,
}

/// Owner of one database and its persisted form
pub struct Controller {
    database: SharedDatabase,
    // Lock order: state before database
    state: Mutex<State>,
    database_name: String,
}

impl Controller {
    /// Open the store described by `config`
    ///
    /// Loads the backing file when it exists, otherwise starts empty.
    pub fn open(config: ControllerConfig) -> Result<Self> {
        let controller = Self {
            database: Arc::new(RwLock::new(None)),
            state: Mutex::new(State {
                path: config.path.clone(),
                callback: config.callback,
                loaded_from_file: false,
            }),
            database_name: config.database_name,
        };
        controller.load_by_file(&config.path, config.delete_cache_first)?;
        Ok(controller)
    }

    /// Process-wide controller at the default cache path
    ///
    /// The first call opens the store; later calls return the same
    /// instance whatever their arguments.
    pub fn get_instance(create_new: bool) -> Result<Arc<Controller>> {
        Self::instance_with(|| ControllerConfig::cache(create_new))
    }

    /// Process-wide controller at `path` (or `<path>/formDB.db`)
    pub fn get_instance_at(path: impl AsRef<Path>, is_folder: bool) -> Result<Arc<Controller>> {
        let config = ControllerConfig::at(path, is_folder);
        Self::instance_with(move || config)
    }

    /// Check whether the process-wide controller has not been opened yet
    pub fn needs_init() -> bool {
        INSTANCE.get().is_none()
    }

    fn instance_with(config: impl FnOnce() -> ControllerConfig) -> Result<Arc<Controller>> {
        INSTANCE
            .get_or_try_init(|| Controller::open(config()).map(Arc::new))
            .map(Arc::clone)
    }

    /// Load the store persisted at `path`
    ///
    /// With `delete_cache_first` the file is removed and the in-memory
    /// database cleared before anything is read. When the file exists its
    /// database and path replace the controller's. `on_create` fires in
    /// every successful case.
    pub fn load_by_file(&self, path: impl AsRef<Path>, delete_cache_first: bool) -> Result<()> {
        let path = path.as_ref();
        if delete_cache_first && path.exists() {
            std::fs::remove_file(path).map_err(|e| FormError::persistence(path, e))?;
            tracing::info!(target: "formdb::engine", path = %path.display(), "deleted cached store");
        }

        let bundle = if path.exists() {
            Some(persist::read_bundle(path)?)
        } else {
            None
        };

        let (current, callback) = {
            let mut state = self.state.lock();
            let callback = state.callback.get();
            match bundle {
                Some(bundle) => {
                    if bundle.path != path {
                        tracing::warn!(
                            target: "formdb::engine",
                            requested = %path.display(),
                            stored = %bundle.path.display(),
                            "store was saved under another path"
                        );
                    }
                    let mut database = bundle.database;
                    if let Some(db) = database.as_mut() {
                        db.unity_callback(callback.clone());
                    }
                    let tables = database.as_ref().map_or(0, Database::len);
                    *self.database.write() = database;
                    state.path = bundle.path;
                    state.loaded_from_file = true;
                    tracing::info!(target: "formdb::engine", path = %state.path.display(), tables, "loaded store");
                }
                None => {
                    if delete_cache_first {
                        *self.database.write() = None;
                    }
                    state.path = path.to_path_buf();
                    state.loaded_from_file = false;
                    tracing::info!(target: "formdb::engine", path = %state.path.display(), "created new store");
                }
            }
            (state.path.clone(), callback)
        };

        if let Some(cb) = callback {
            cb.on_create(&current)?;
        }
        Ok(())
    }

    /// Persist the database and path to the backing file
    ///
    /// The file is replaced atomically; on failure the previous file is
    /// left untouched.
    pub fn save_all(&self) -> Result<()> {
        let (path, callback) = {
            let state = self.state.lock();
            (state.path.clone(), state.callback.get())
        };
        {
            let guard = self.database.read();
            persist::write_bundle(&path, guard.as_ref())?;
            tracing::info!(
                target: "formdb::engine",
                path = %path.display(),
                records = guard.as_ref().map_or(0, Database::record_count),
                "saved store"
            );
        }
        if let Some(cb) = callback {
            cb.on_saved(&path)?;
        }
        Ok(())
    }

    /// Adopt `database` when none is held, otherwise merge it in
    pub fn put(&self, database: Database) -> Result<()> {
        let callback = self.callback();
        let mut guard = self.database.write();
        match guard.as_mut() {
            Some(held) => {
                let inserted = held.merge(database)?;
                tracing::debug!(target: "formdb::engine", db = %held.name(), inserted, "merged database");
            }
            None => {
                let mut database = database;
                database.unity_callback(callback.clone());
                tracing::debug!(target: "formdb::engine", db = %database.name(), "adopted database");
                *guard = Some(database);
            }
        }

        let guard = RwLockWriteGuard::downgrade(guard);
        if let (Some(cb), Some(db)) = (callback, guard.as_ref()) {
            cb.put_db(db)?;
        }
        Ok(())
    }

    /// Always fails: the held database cannot be removed
    pub fn delete(&self, database: &Database) -> Result<()> {
        tracing::warn!(target: "formdb::engine", db = %database.name(), "database deletion rejected");
        Err(FormError::UnsupportedOperation(format!(
            "database '{}' cannot be deleted through the controller",
            database.name()
        )))
    }

    /// Insert an entity value into its table
    ///
    /// Creates the database (and the table) on first use. Table hooks run
    /// with the write lock held.
    pub fn insert<E: Entity>(&self, entity: &E) -> Result<()> {
        let record = entity.to_record()?;
        let callback = self.callback();
        let mut guard = self.database.write();
        let db = guard.get_or_insert_with(|| {
            let mut db = Database::new(self.database_name.clone());
            db.unity_callback(callback);
            db
        });
        db.put_record(record, Some(E::TABLE_NAME))
    }

    /// Remove an entity value from its table
    ///
    /// Table hooks run with the write lock held.
    pub fn remove<E: Entity>(&self, entity: &E) -> Result<()> {
        let record = entity.to_record()?.in_table(E::TABLE_NAME);
        match self.database.write().as_mut() {
            Some(db) => db.delete_record(&record),
            None => Err(FormError::NotFound {
                table: E::TABLE_NAME.to_string(),
            }),
        }
    }

    /// Whether the last load read an existing file
    pub fn is_loaded_file(&self) -> bool {
        self.state.lock().loaded_from_file
    }

    /// Backing file path
    pub fn path(&self) -> PathBuf {
        self.state.lock().path.clone()
    }

    /// Attach a controller callback, warning if one was set
    ///
    /// Only controller-level hooks see it; use [`Controller::unity_callback`]
    /// to reach the database and its tables too.
    pub fn add_callback(&self, callback: SharedCallback) {
        if self.state.lock().callback.replace(Some(callback)) {
            tracing::warn!(target: "formdb::engine", "replacing existing controller callback");
        }
    }

    /// Set or clear the callback on the controller, database and tables
    pub fn unity_callback(&self, callback: Option<SharedCallback>) {
        let mut state = self.state.lock();
        if let Some(db) = self.database.write().as_mut() {
            db.unity_callback(callback.clone());
        }
        state.callback.replace(callback);
    }

    /// Read access to the held database
    pub fn read(&self) -> RwLockReadGuard<'_, Option<Database>> {
        self.database.read()
    }

    /// Write access to the held database
    pub fn write(&self) -> RwLockWriteGuard<'_, Option<Database>> {
        self.database.write()
    }

    /// Shared handle for concurrent readers
    pub fn database_handle(&self) -> SharedDatabase {
        Arc::clone(&self.database)
    }

    fn callback(&self) -> Option<SharedCallback> {
        self.state.lock().callback.get()
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Controller")
            .field("path", &state.path)
            .field("loaded_from_file", &state.loaded_from_file)
            .field("callback", &state.callback)
            .field("database", &self.database.read().as_ref().map(|db| db.name().to_string()))
            .finish()
    }
}
