use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_report() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("mortgage"));
    cmd.args(["700000", "30", "5.635", "--first-payment", "2019-01-03"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Monthly payment: 4034.02"))
        .stdout(predicate::str::contains("Total interest: 752245.57"))
        .stdout(predicate::str::contains("2019:"))
        .stdout(predicate::str::contains("Month: Dec"));

    Ok(())
}

#[test]
fn test_cli_csv() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("mortgage"));
    cmd.args(["120000", "1", "0", "--first-payment", "2024-03-01", "--format", "csv"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("month,principal,interest,"))
        .stdout(predicate::str::contains("12,10000,0,0,0,0,0,120000,120000,0"));

    Ok(())
}

#[test]
fn test_cli_rejects_invalid_input() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("mortgage"));
    cmd.args(["0", "30", "5", "--first-payment", "2024-01-01"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("principal must be positive"));

    let mut cmd = Command::new(cargo_bin!("mortgage"));
    cmd.args(["100000", "30", "-1", "--first-payment", "2024-01-01"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("must not be negative"));

    let mut cmd = Command::new(cargo_bin!("mortgage"));
    cmd.args(["100000", "0", "5"]);
    cmd.assert().failure();

    let mut cmd = Command::new(cargo_bin!("mortgage"));
    cmd.args(["1000", "300000000", "0", "--first-payment", "2024-01-01"]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("exceeds the maximum"));

    Ok(())
}

#[test]
fn test_cli_lines() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("mortgage"));
    cmd.args(["120000", "1", "0", "--first-payment", "2024-03-01", "--format", "lines"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with(
            "pmt number 1, date 2024-03-01, payment $10000.00",
        ))
        .stdout(predicate::str::contains(
            "pmt number 12, date 2025-02-01, payment $10000.00, principal $10000.00, interest $0.00, remaining principal $0.00",
        ));

    Ok(())
}
