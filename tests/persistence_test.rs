#![cfg(feature = "storage-rocksdb")]

mod common;

use assert_cmd::cargo_bin;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_rocksdb_flags_prevent_resend_across_runs() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");
    let payments = common::payments_csv(&["P1,42,Clean Water Fund,pending,25.00"]);
    let events = common::events_csv(&["status_changed,P1,pending,publish,,"]);

    let run = || {
        Command::new(cargo_bin!("donation-beacon"))
            .arg(events.path())
            .arg("--payments")
            .arg(payments.path())
            .arg("--tracking-id")
            .arg("UA-123")
            .arg("--dry-run")
            .arg("--db-path")
            .arg(&db_path)
            .output()
            .expect("Failed to execute command")
    };

    // 1. First run: the completion beacon goes out
    let output1 = run();
    assert!(output1.status.success());
    assert!(String::from_utf8_lossy(&output1.stdout).contains("P1,true,false"));
    assert!(String::from_utf8_lossy(&output1.stderr).contains("tid=UA-123"));

    // 2. Second run with the same DB: flag recovered, nothing sent again
    let output2 = run();
    assert!(output2.status.success());
    assert!(String::from_utf8_lossy(&output2.stdout).contains("P1,true,false"));
    assert!(!String::from_utf8_lossy(&output2.stderr).contains("tid=UA-123"));
}
