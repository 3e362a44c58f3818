use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let invoices = dir.path().join("invoices.csv");

    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/commands.jsonl")
        .arg("--ledger")
        .arg("tests/fixtures/ledger.json")
        .arg("--invoices")
        .arg(&invoices);

    cmd.assert()
        .success()
        // Fund donation billed on a new invoice
        .stdout(predicate::str::contains(
            r#"{"Donation":[2],"Gift":[],"SendAGiftPublishResult":"Cannot send the appeals/gifts"}"#,
        ))
        // Notified once, not on the second confirmation
        .stdout(predicate::str::contains(r#"{"invoice":2,"notification":1,"paid":true}"#))
        .stdout(predicate::str::contains(r#"{"invoice":2,"notification":null,"paid":true}"#))
        // 50 does not match the open 42 invoice
        .stdout(predicate::str::contains("doesn't match any expected payment"))
        .stdout(predicate::str::contains(r#""user_facing":true"#))
        // 42 + 8 merged into the sponsorship invoice, then rolled back
        .stdout(predicate::str::contains(
            r#"{"Donation":[1],"Gift":[],"SendAGiftPublishResult":"Cannot send the appeals/gifts"}"#,
        ))
        .stdout(predicate::str::contains(r#"{"jobs":1}"#));

    let csv = std::fs::read_to_string(&invoices)?;
    assert!(csv.starts_with("invoice,partner,date,state,payment_state,invoice_category"));
    assert!(
        csv.contains("1,100,2024-01-01,posted,not_paid,sponsorship,1,Sponsorship,sponsorship,1,1,42")
    );
    assert!(csv.contains(",paid,fund,3,Water fund,fund,,1,25"));
    assert!(!csv.contains("1,100,2024-01-01,posted,not_paid,sponsorship,3,Water fund"));

    Ok(())
}

#[test]
fn test_already_treated_payload() -> Result<(), Box<dyn std::error::Error>> {
    let mut commands = tempfile::NamedTempFile::new()?;
    std::io::Write::write_all(
        &mut commands,
        br#"{"action": "donate", "payload": {"supporter": 100, "LastInsertedGiftId": 12, "appealtype": [30], "appealamount": [25]}}"#,
    )?;

    let mut cmd = Command::new(cargo_bin!("donation-intake"));
    cmd.arg(commands.path())
        .arg("--ledger")
        .arg("tests/fixtures/ledger.json");

    cmd.assert().success().stdout(predicate::str::contains(
        r#"{"Donation":[],"Gift":[],"SendAGiftPublishResult":"Donation data Recieved."}"#,
    ));
    Ok(())
}

#[test]
fn test_bad_lines_do_not_stop_processing() -> Result<(), Box<dyn std::error::Error>> {
    let mut commands = tempfile::NamedTempFile::new()?;
    std::io::Write::write_all(
        &mut commands,
        b"not json\n{\"action\": \"pay\", \"invoice_id\": 99}\n{\"action\": \"run_jobs\"}\n",
    )?;

    let mut cmd = Command::new(cargo_bin!("donation-intake"));
    cmd.arg(commands.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("JSON error"))
        .stdout(predicate::str::contains("Invoice 99 not found"))
        .stdout(predicate::str::contains(r#"{"jobs":0}"#))
        .stderr(predicate::str::contains("Error processing command"));
    Ok(())
}

#[test]
fn test_missing_input_fails() {
    let mut cmd = Command::new(cargo_bin!("donation-intake"));
    cmd.arg("tests/fixtures/does-not-exist.jsonl");
    cmd.assert().failure();
}
