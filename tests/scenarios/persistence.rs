//! Save, reopen and cache handling

use crate::test_utils::{init_tracing, Course, Student};
use formdb::{Controller, ControllerConfig, Entity, FormCallback, FormError, Result};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Default)]
struct PathLog {
    created: Mutex<Vec<PathBuf>>,
    saved: Mutex<Vec<PathBuf>>,
}

impl FormCallback for PathLog {
    fn on_create(&self, path: &Path) -> Result<()> {
        self.created.lock().push(path.to_path_buf());
        Ok(())
    }

    fn on_saved(&self, path: &Path) -> Result<()> {
        self.saved.lock().push(path.to_path_buf());
        Ok(())
    }
}

#[test]
fn test_save_and_reopen_keeps_students() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("school.db");

    let controller = Controller::open(ControllerConfig::new(&path)).unwrap();
    controller.insert(&Student::new(1, "Ann")).unwrap();
    controller.insert(&Student::new(2, "Bo")).unwrap();
    controller.insert(&Course { code: "math", credits: 5 }).unwrap();
    controller.save_all().unwrap();
    let saved = controller.read().clone();
    drop(controller);

    let reopened = Controller::open(ControllerConfig::new(&path)).unwrap();
    assert!(reopened.is_loaded_file());
    assert_eq!(reopened.path(), path);

    let guard = reopened.read();
    let db = guard.as_ref().unwrap();
    assert_eq!(Some(db), saved.as_ref());
    let students = db.table(Student::TABLE_NAME).unwrap();
    assert_eq!(students.len(), 2);
    assert!(students.contains(&Student::new(1, "Ann").record()));
    assert!(students.contains(&Student::new(2, "Bo").record()));
}

#[test]
fn test_reopened_store_accepts_writes() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let config = ControllerConfig::folder(dir.path());

    let controller = Controller::open(config.clone()).unwrap();
    controller.insert(&Student::new(1, "Ann")).unwrap();
    controller.save_all().unwrap();

    let reopened = Controller::open(config.clone()).unwrap();
    assert!(matches!(
        reopened.insert(&Student::new(1, "Ann")),
        Err(FormError::DuplicateEntry { .. })
    ));
    reopened.insert(&Student::new(2, "Bo")).unwrap();
    reopened.save_all().unwrap();

    let third = Controller::open(config).unwrap();
    assert_eq!(third.read().as_ref().unwrap().record_count(), 2);
}

#[test]
fn test_lifecycle_hooks_see_the_store_path() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let log = Arc::new(PathLog::default());
    let config = ControllerConfig::folder(dir.path()).callback(log.clone());
    let expected = dir.path().join("formDB.db");

    let controller = Controller::open(config.clone()).unwrap();
    controller.save_all().unwrap();
    Controller::open(config).unwrap();

    assert_eq!(*log.created.lock(), vec![expected.clone(), expected.clone()]);
    assert_eq!(*log.saved.lock(), vec![expected]);
}

#[test]
fn test_create_new_discards_the_cache() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let config = ControllerConfig::folder(dir.path());

    let controller = Controller::open(config.clone()).unwrap();
    controller.insert(&Student::new(1, "Ann")).unwrap();
    controller.save_all().unwrap();

    let fresh = Controller::open(config.delete_cache_first(true)).unwrap();
    assert!(!fresh.is_loaded_file());
    assert!(fresh.read().is_none());
}

#[test]
fn test_corrupt_store_fails_to_open() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("formDB.db");
    std::fs::write(&path, b"\x00\x01\x02 not a store").unwrap();

    let err = Controller::open(ControllerConfig::new(&path)).unwrap_err();
    assert!(matches!(err, FormError::PersistenceFailure { .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_save_into_missing_directory() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a").join("b").join("store.db");
    let controller = Controller::open(ControllerConfig::new(&path)).unwrap();
    controller.insert(&Student::new(1, "Ann")).unwrap();
    controller.save_all().unwrap();
    assert!(path.is_file());
}
