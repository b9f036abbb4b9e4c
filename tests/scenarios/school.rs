//! The Student table walk-through

use crate::test_utils::{ids, init_tracing, name_is, Student};
use formdb::{
    Controller, ControllerConfig, Entity, FormError, QueryEngine, ScanUnit, StackedScan, Strategy,
};
use std::sync::Arc;
use tempfile::TempDir;

fn school(dir: &TempDir) -> Controller {
    init_tracing();
    let controller =
        Controller::open(ControllerConfig::folder(dir.path()).database_name("school")).unwrap();
    controller.insert(&Student::new(1, "Ann")).unwrap();
    controller.insert(&Student::new(2, "Bo")).unwrap();
    controller
}

#[test]
fn test_query_by_name_returns_exactly_ann() {
    let dir = TempDir::new().unwrap();
    let controller = school(&dir);
    let engine = QueryEngine::default();

    for unit in [ScanUnit::Table, ScanUnit::Column] {
        let found = engine
            .execute_on(
                &controller,
                Strategy::Partitioned {
                    unit,
                    predicate: name_is("Ann"),
                },
            )
            .unwrap();
        assert_eq!(found, vec![Student::new(1, "Ann").record()], "{unit:?}");
    }
}

#[test]
fn test_reinserting_ann_is_rejected() {
    let dir = TempDir::new().unwrap();
    let controller = school(&dir);

    let err = controller.insert(&Student::new(1, "Ann")).unwrap_err();
    assert!(matches!(err, FormError::DuplicateEntry { .. }));
    assert!(!err.is_fatal());

    let guard = controller.read();
    let db = guard.as_ref().unwrap();
    assert_eq!(db.name(), "school");
    assert_eq!(db.table(Student::TABLE_NAME).unwrap().len(), 2);
}

#[test]
fn test_stacked_scan_by_entity_schema() {
    let dir = TempDir::new().unwrap();
    let controller = school(&dir);

    let scan = Arc::new(StackedScan::new());
    scan.add_type_column(Student::schema().unwrap(), name_is("Ann"))
        .add_type_column(Student::schema().unwrap(), name_is("Bo"));
    let found = QueryEngine::default()
        .execute_on(&controller, Strategy::Stacked(scan))
        .unwrap();
    assert_eq!(ids(&found), vec![1, 2]);
}

#[test]
fn test_remove_then_query() {
    let dir = TempDir::new().unwrap();
    let controller = school(&dir);
    controller.remove(&Student::new(1, "Ann")).unwrap();

    let found = QueryEngine::default()
        .execute_on(
            &controller,
            Strategy::Partitioned {
                unit: ScanUnit::Table,
                predicate: name_is("Ann"),
            },
        )
        .unwrap();
    assert!(found.is_empty());

    assert!(matches!(
        controller.remove(&Student::new(1, "Ann")),
        Err(FormError::NotFound { .. })
    ));
}

#[test]
fn test_modify_is_delete_then_put() {
    let dir = TempDir::new().unwrap();
    let controller = school(&dir);

    let old = Student::new(2, "Bo");
    controller.remove(&old).unwrap();
    controller.insert(&Student::new(2, "Bob")).unwrap();

    let guard = controller.read();
    let table = guard.as_ref().unwrap().table("Student").unwrap();
    assert_eq!(table.len(), 2);
    assert!(table.contains(&Student::new(2, "Bob").record()));
    assert!(!table.contains(&old.record()));
}
