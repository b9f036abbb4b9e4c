//! Partitioned/stacked agreement and wait bounds

use crate::test_utils::{ids, init_tracing, name_is, Student};
use formdb::{
    predicate, Controller, ControllerConfig, FormError, PartitionedScan, QueryConfig, QueryEngine,
    ScanUnit, StackedScan, Strategy,
};
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tempfile::TempDir;

fn populated(dir: &TempDir, count: i32) -> Controller {
    init_tracing();
    let controller = Controller::open(ControllerConfig::folder(dir.path())).unwrap();
    for id in 0..count {
        controller
            .insert(&Student::new(id, if id % 3 == 0 { "Ann" } else { "Bo" }))
            .unwrap();
    }
    controller
}

#[test]
fn test_all_strategies_return_the_same_matches() {
    let dir = TempDir::new().unwrap();
    let controller = populated(&dir, 300);
    let engine = QueryEngine::new(QueryConfig::new().partitions(5));

    let by_table = engine
        .execute_on(
            &controller,
            Strategy::Partitioned {
                unit: ScanUnit::Table,
                predicate: name_is("Ann"),
            },
        )
        .unwrap();
    let by_column = engine
        .execute_on(
            &controller,
            Strategy::Partitioned {
                unit: ScanUnit::Column,
                predicate: name_is("Ann"),
            },
        )
        .unwrap();
    let scan = Arc::new(StackedScan::new());
    scan.add_type_column(Student::new(0, "").record(), name_is("Ann"));
    let stacked = engine
        .execute_on(&controller, Strategy::Stacked(scan))
        .unwrap();

    assert_eq!(by_table.len(), 100);
    assert_eq!(ids(&by_table), ids(&by_column));
    assert_eq!(ids(&by_table), ids(&stacked));
}

#[test]
fn test_slow_predicate_times_out() {
    let dir = TempDir::new().unwrap();
    let controller = populated(&dir, 3);
    let scan = PartitionedScan::new(QueryConfig::new().wait_bound(Duration::from_millis(25)));

    let slow = predicate(|_| {
        std::thread::sleep(Duration::from_millis(250));
        true
    });
    let err = scan
        .sync_result(&controller.database_handle(), slow, ScanUnit::Column)
        .unwrap_err();
    assert!(matches!(err, FormError::QueryTimeout(d) if d == Duration::from_millis(25)));
}

#[test]
fn test_async_result_does_not_block_writers() {
    let dir = TempDir::new().unwrap();
    let controller = populated(&dir, 50);
    let scan = PartitionedScan::default();
    let (tx, rx) = mpsc::channel();

    scan.async_result(
        &controller.database_handle(),
        name_is("Bo"),
        ScanUnit::Column,
        move |res| {
            let _ = tx.send(res.map(|found| found.len()));
        },
    )
    .unwrap();

    // Column chunks are copied out before dispatch
    controller.insert(&Student::new(1000, "Bo")).unwrap();
    let found = rx.recv_timeout(Duration::from_secs(30)).unwrap().unwrap();
    assert_eq!(found, 33);
}

#[test]
fn test_stacked_scan_requires_a_consumer() {
    let dir = TempDir::new().unwrap();
    let controller = populated(&dir, 5);
    let scan = StackedScan::new();
    scan.add_type_column(Student::new(0, "").record(), name_is("Ann"));

    let guard = controller.read();
    let db = guard.as_ref().unwrap();
    assert!(matches!(scan.run(db), Err(FormError::MissingCallback)));

    let (tx, rx) = mpsc::channel();
    let tx = parking_lot::Mutex::new(tx);
    scan.get_result(move |found| {
        let _ = tx.lock().send(found.len());
    });
    assert_eq!(scan.run(db).unwrap(), 2);
    assert_eq!(rx.try_recv().unwrap(), 2);
}
