mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_malformed_event_rows_are_skipped() {
    let payments = common::payments_csv(&["P1,42,Clean Water Fund,pending,25.00"]);
    let events = common::events_csv(&[
        // Unknown event type
        "refund_now,P1,,,,",
        // Missing new status
        "status_changed,P1,pending,,,",
        // Valid completion
        "status_changed,P1,pending,publish,,",
    ]);

    let mut cmd = Command::new(cargo_bin!("donation-beacon"));
    cmd.arg(events.path())
        .arg("--payments")
        .arg(payments.path())
        .arg("--tracking-id")
        .arg("UA-123")
        .arg("--dry-run");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading event"))
        .stdout(predicate::str::contains("P1,true,false"));
}

#[test]
fn test_malformed_payment_rows_are_skipped() {
    let payments = common::payments_csv(&[
        "P1,42,Clean Water Fund,pending,not_a_number",
        "P2,42,Clean Water Fund,pending,10.00",
    ]);
    let events = common::events_csv(&["status_changed,P2,pending,publish,,"]);

    let mut cmd = Command::new(cargo_bin!("donation-beacon"));
    cmd.arg(events.path())
        .arg("--payments")
        .arg(payments.path())
        .arg("--tracking-id")
        .arg("UA-123")
        .arg("--dry-run");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading payment"))
        .stdout(predicate::str::contains("P1").not())
        .stdout(predicate::str::contains("P2,true,false"));
}

#[test]
fn test_events_for_unknown_payments_do_not_abort() {
    let payments = common::payments_csv(&["P1,42,Clean Water Fund,pending,25.00"]);
    let events = common::events_csv(&[
        "status_changed,P404,pending,publish,,",
        "admin_page,P404,,,,",
        "status_changed,P1,pending,publish,,",
    ]);

    let mut cmd = Command::new(cargo_bin!("donation-beacon"));
    cmd.arg(events.path())
        .arg("--payments")
        .arg(payments.path())
        .arg("--tracking-id")
        .arg("UA-123")
        .arg("--dry-run");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("P1,true,false"));
}
