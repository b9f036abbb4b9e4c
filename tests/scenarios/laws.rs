//! Merge, dedup and shape invariants across the stack

use crate::test_utils::{init_tracing, Student};
use formdb::{
    Controller, ControllerConfig, Database, FormError, Record, StackedScan, Table, TablePut,
    UnitType,
};
use proptest::prelude::*;
use tempfile::TempDir;

fn students(ids: impl IntoIterator<Item = i32>) -> Table {
    let mut table = Table::new(Student::new(0, "").record(), "Student");
    for id in ids {
        table.put(Student::new(id, &format!("s{id}")).record()).unwrap();
    }
    table
}

#[test]
fn test_merge_law_same_name_same_shape() {
    init_tracing();
    let mut db = Database::new("school");
    assert_eq!(db.put_table(students([1, 2, 3])).unwrap(), TablePut::Inserted);
    assert_eq!(db.put_table(students([3, 4])).unwrap(), TablePut::Merged(1));

    let table = db.table("Student").unwrap();
    assert_eq!(table.len(), 4);
    for id in 1..=4 {
        assert!(table.contains(&Student::new(id, &format!("s{id}")).record()));
    }
}

#[test]
fn test_controller_put_merges_databases() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let controller = Controller::open(ControllerConfig::folder(dir.path())).unwrap();

    let mut first = Database::new("school");
    first.put_table(students([1, 2])).unwrap();
    let mut second = Database::new("school");
    second.put_table(students([2, 3])).unwrap();

    controller.put(first).unwrap();
    controller.put(second).unwrap();
    assert_eq!(controller.read().as_ref().unwrap().record_count(), 3);
    assert!(matches!(
        controller.delete(&Database::new("school")),
        Err(FormError::UnsupportedOperation(_))
    ));
}

#[test]
fn test_name_bound_to_other_shape_conflicts() {
    init_tracing();
    let mut db = Database::new("school");
    db.put_table(students([1])).unwrap();

    let other = Record::new()
        .with_primary("code", UnitType::String, "math")
        .unwrap();
    let err = db.put_table(Table::new(other, "Student")).unwrap_err();
    assert!(matches!(err, FormError::NameConflict(_)));
    assert_eq!(db.table("Student").unwrap().len(), 1);
}

#[test]
fn test_same_shape_different_names_are_distinct() {
    init_tracing();
    let mut db = Database::new("school");
    db.put_record(Student::new(1, "Ann").record(), Some("Student"))
        .unwrap();
    db.put_record(Student::new(1, "Ann").record(), Some("Alumni"))
        .unwrap();
    assert_eq!(db.len(), 2);
    assert_eq!(db.tables_with_shape(Student::new(0, "").record().type_hash()).len(), 2);
    assert!(matches!(
        db.resolve_table(&Student::new(5, "x").record()),
        Err(FormError::AmbiguousShape { .. })
    ));
    let hinted = Student::new(5, "x").record().in_table("Alumni");
    assert_eq!(db.resolve_table(&hinted).unwrap().unwrap().name(), "Alumni");
}

#[test]
fn test_stacked_dedup_law() {
    init_tracing();
    let mut db = Database::new("school");
    db.put_table(students(0..20)).unwrap();

    let scan = StackedScan::new();
    let template = Student::new(0, "").record();
    scan.add_type_column(template.clone(), formdb::predicate(|_| true))
        .add_type_column(template.clone(), formdb::predicate(|_| true))
        .add_type_column(
            template,
            formdb::predicate(|r| r.value("id").and_then(|v| v.as_i64()).map_or(false, |i| i < 5)),
        );
    assert_eq!(scan.search(&db).unwrap().len(), 20);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_members_share_table_shape(ids in prop::collection::vec(0i32..50, 0..40)) {
        let mut db = Database::new("school");
        for id in &ids {
            let _ = db.put_record(Student::new(*id, "x").record(), Some("Student"));
            let stray = Record::new()
                .with_primary("code", UnitType::Int, *id)
                .unwrap();
            let _ = db.put_record(stray, Some("Student"));
        }
        if let Some(table) = db.table("Student") {
            for member in table.iter() {
                prop_assert_eq!(member.type_hash(), table.type_hash());
            }
            let distinct: std::collections::BTreeSet<_> = ids.iter().collect();
            prop_assert_eq!(table.len(), distinct.len());
        }
    }
}
