use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

mod common;

#[test]
fn test_malformed_rows_are_skipped() {
    let file = common::commands_file(&[
        "charge, 1, 10",
        // Unknown command type
        "refund, 1, 5",
        // Missing amount for a mutation
        "charge, 1,",
        // Text in amount field
        "charge, 1, lots",
        "charge, 1, 5",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("pointledger"));
    cmd.arg(file.path()).env_remove("RUST_LOG");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading command"))
        .stdout(predicate::str::is_match(r"(?m)^1,15,\d+$").unwrap());
}

#[test]
fn test_non_positive_user_ids_are_skipped() {
    let file = common::commands_file(&["charge, 0, 10", "charge, -4, 10", "charge, 2, 1"]).unwrap();

    let mut cmd = Command::new(cargo_bin!("pointledger"));
    cmd.arg(file.path()).env_remove("RUST_LOG");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("user id must be positive"))
        .stdout(predicate::str::is_match(r"(?m)^2,1,\d+$").unwrap())
        .stdout(predicate::str::is_match(r"(?m)^0,").unwrap().not());
}

#[test]
fn test_rejected_mutations_leave_no_history() {
    let file = common::commands_file(&["charge, 9, 50", "charge, 9, -5", "use, 9, 51", "use, 9, -1"])
        .unwrap();

    let mut cmd = Command::new(cargo_bin!("pointledger"));
    cmd.arg(file.path()).arg("--history");

    cmd.assert()
        .success()
        .stdout(predicate::str::is_match(r"(?m)^9,50,\d+$").unwrap())
        .stdout(predicate::str::is_match(r"(?m)^1,9,50,CHARGE,\d+$").unwrap())
        .stdout(predicate::str::contains("USE").not());
}
