use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn commands_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "type, account, counterpart, amount").unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

#[test]
fn test_cli_end_to_end() {
    let file = commands_file(&["create, X, , 100", "create, Y, , 50", "transfer, X, Y, 50"]);

    let mut cmd = Command::new(cargo_bin!("transfer-ledger"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("account,balance"))
        .stdout(predicate::str::contains("X,50"))
        .stdout(predicate::str::contains("Y,100"));
}

#[test]
fn test_cli_concurrent_workers() {
    let mut lines = vec!["create, A, , 100", "create, B, , 50"];
    lines.extend(std::iter::repeat_n("transfer, A, B, 1", 50));
    let file = commands_file(&lines);

    let mut cmd = Command::new(cargo_bin!("transfer-ledger"));
    cmd.arg(file.path()).arg("--workers").arg("8");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("A,50"))
        .stdout(predicate::str::contains("B,100"));
}

#[test]
fn test_cli_reports_failed_and_malformed_commands() {
    let file = commands_file(&[
        "create, X, , 10",
        "create, X, , 99",
        "refund, X, , 1",
        "transfer, X, Z, 1",
        "transfer, X, X, 0",
        "create, Y",
        "transfer, X, Y, 11",
        "transfer, X, Y, 2.5",
    ]);

    let mut cmd = Command::new(cargo_bin!("transfer-ledger"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading command 3"))
        .stderr(predicate::str::contains("Error reading command 5"))
        .stderr(predicate::str::contains(
            "Error processing command 2: Account id X already exists!",
        ))
        .stderr(predicate::str::contains(
            "Error processing command 4: Account Z does not exist",
        ))
        .stderr(predicate::str::contains(
            "Error processing command 7: Account X has insufficient funds",
        ))
        .stdout(predicate::str::contains("X,7.5"))
        .stdout(predicate::str::contains("Y,2.5"));
}

#[test]
fn test_cli_reports_overflowing_deposit_without_debiting() {
    let file = commands_file(&[
        "create, X, , 79228162514264337593543950335",
        "create, Y, , 10",
        "transfer, Y, X, 1",
    ]);

    let mut cmd = Command::new(cargo_bin!("transfer-ledger"));
    cmd.arg(file.path()).arg("--workers").arg("4");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains(
            "Error processing command 3: Deposit would overflow the balance of account X",
        ))
        .stdout(predicate::str::contains("X,79228162514264337593543950335"))
        .stdout(predicate::str::contains("Y,10"));
}

#[test]
fn test_cli_json_output_and_config_file() {
    let file = commands_file(&["create, X, , 3", "create, Y, , 0", "transfer, Y, X, 1"]);
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, r#"{{"lock_timeout_ms": 100, "lock_order": "request"}}"#).unwrap();

    let mut cmd = Command::new(cargo_bin!("transfer-ledger"));
    cmd.arg(file.path())
        .arg("--config")
        .arg(config.path())
        .arg("--json");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""id": "X""#))
        .stdout(predicate::str::contains(r#""balance": "3""#))
        .stderr(predicate::str::contains(
            "Error processing command 3: Account Y has insufficient funds",
        ));
}

#[test]
fn test_cli_rejects_invalid_config() {
    let file = commands_file(&["create, X, , 3"]);

    let mut cmd = Command::new(cargo_bin!("transfer-ledger"));
    cmd.arg(file.path()).arg("--workers").arg("0");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("workers must be greater than zero"));
}
