// ==============================================
// OPERATION LOG AND SNAPSHOT FILES (integration)
// ==============================================

use std::fs;
use std::io;

use freqcache::oplog::{self, Operation};
use freqcache::snapshot;
use freqcache::store::CacheStore;
use freqcache::workload::{OperationGenerator, WorkloadConfig};
use tempfile::tempdir;

#[test]
fn generated_log_round_trips_through_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ops.log");

    let ops = OperationGenerator::new(WorkloadConfig::default()).generate(500);
    oplog::write_log(&path, &ops).unwrap();

    assert_eq!(oplog::read_log(&path).unwrap(), ops);
}

#[test]
fn hand_written_log_replays_to_expected_snapshot() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("session.log");
    fs::write(
        &log,
        "PUT user:1 Ada Lovelace\n\
         PUT user:2 Alan Turing\n\
         get user:1\n\
         # comment lines are ignored\n\
         PUT user:3 Grace Hopper\n\
         \n\
         REMOVE user:9\n",
    )
    .unwrap();

    let ops = oplog::read_log(&log).unwrap();
    assert_eq!(ops.len(), 5);
    assert_eq!(ops[0], Operation::put("user:1", "Ada Lovelace"));

    let mut store = CacheStore::new(Some(2));
    let stats = oplog::replay(&mut store, &ops);
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.removed, 0);

    let out = dir.path().join("snapshot.txt");
    snapshot::write_snapshot(&out, &store).unwrap();
    assert_eq!(
        snapshot::read_snapshot(&out).unwrap(),
        "user:1=Ada Lovelace\nuser:3=Grace Hopper"
    );
}

#[test]
fn snapshots_of_equal_runs_compare_clean() {
    let dir = tempdir().unwrap();
    let ops = OperationGenerator::new(WorkloadConfig {
        seed: 9,
        key_space: 20,
        ..WorkloadConfig::default()
    })
    .generate(1_000);

    let paths = [dir.path().join("a.txt"), dir.path().join("b.txt")];
    for path in &paths {
        let mut store = CacheStore::new(Some(8));
        oplog::replay(&mut store, &ops);
        snapshot::write_snapshot(path, &store).unwrap();
    }

    let left = snapshot::read_snapshot(&paths[0]).unwrap();
    let right = snapshot::read_snapshot(&paths[1]).unwrap();
    assert!(snapshot::compare(&left, &right).is_empty());

    let mut unlimited = CacheStore::unlimited();
    oplog::replay(&mut unlimited, &ops);
    let diff = snapshot::compare(&left, &snapshot::render_store(&unlimited));
    assert!(!diff.is_empty());
    assert!(diff.only_left.is_empty());
}

#[test]
fn missing_files_report_their_path() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.log");

    let err = oplog::read_log(&missing).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
    assert_eq!(err.path(), missing.as_path());
    assert!(err.to_string().contains("nope.log"));

    let err = snapshot::read_snapshot(&missing).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}
