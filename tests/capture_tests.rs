use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::{JPEG, kiosk};

#[test]
fn test_init_creates_database() {
    let k = kiosk();

    k.cmd()
        .args(["--db", &k.db, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    assert!(std::path::Path::new(&k.db).exists());
}

#[test]
fn test_capture_in_then_out() {
    let k = kiosk();
    let photo = k.photo.to_string_lossy().to_string();

    k.cmd()
        .args(["capture", "--pin", "123456", "--photo", &photo])
        .assert()
        .success()
        .stdout(contains("Ana Cruz clocked in").and(contains("Synced")));

    k.cmd()
        .args(["capture", "--pin", "123456", "--photo", &photo])
        .assert()
        .success()
        .stdout(contains("Ana Cruz clocked out"));

    let records = k.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["employeeID"], "E1");
    assert_eq!(records[0]["action"], "clock_in");
    assert_eq!(records[1]["action"], "clock_out");
    assert!(records[0]["photoIn"].is_string());
    assert!(records[1]["photoOut"].is_string());
    assert!(records[0]["captureKey"].as_str().unwrap().starts_with("E1:"));

    // the uploaded photo sits at its blob key, the staged copy is gone
    let key = records[0]["photoInPath"].as_str().unwrap();
    assert!(key.starts_with("logs/E1/"));
    assert_eq!(std::fs::read(k.blob(key)).unwrap(), JPEG);
    assert!(k.staged_photos().is_empty());

    // synced rows are purged after the run by default
    k.cmd()
        .args(["pending", "--all"])
        .assert()
        .success()
        .stdout(contains("No pending events"));
}

#[test]
fn test_blank_name_greets_as_employee() {
    let k = kiosk();

    k.cmd()
        .args(["capture", "--pin", "222222", "--no-sync"])
        .assert()
        .success()
        .stdout(contains("Employee clocked in"));
}

#[test]
fn test_capture_rejects_bad_pins() {
    let k = kiosk();

    k.cmd()
        .args(["capture", "--pin", "12345"])
        .assert()
        .failure()
        .stderr(contains("Enter a 6-digit PIN"));

    k.cmd()
        .args(["capture", "--pin", "000000"])
        .assert()
        .failure()
        .stderr(contains("Invalid PIN"));

    k.cmd()
        .args(["capture", "--pin", "999999"])
        .assert()
        .failure()
        .stderr(contains("Inactive employee: Old Hand"));

    assert!(k.records().is_empty());
}

#[test]
fn test_capture_rejects_non_image() {
    let k = kiosk();
    let bogus = k.home.path().join("notes.txt");
    std::fs::write(&bogus, "not a photo").unwrap();

    k.cmd()
        .args(["capture", "--pin", "123456", "--photo", &bogus.to_string_lossy()])
        .assert()
        .failure()
        .stderr(contains("Invalid photo"));

    k.cmd()
        .args(["status"])
        .assert()
        .success()
        .stdout(contains("Pending:").and(contains("0")));
}

#[test]
fn test_capture_fails_when_remote_unreachable() {
    let k = kiosk();
    k.go_offline();

    k.cmd()
        .args(["capture", "--pin", "123456"])
        .assert()
        .failure()
        .stderr(contains("Employee lookup failed"));

    k.go_online();
    k.cmd()
        .args(["pending"])
        .assert()
        .success()
        .stdout(contains("No pending events"));
}

#[test]
fn test_queued_captures_sync_later_in_order() {
    let k = kiosk();
    k.configure(|cfg| cfg.capture.consider_pending = true);

    k.cmd()
        .args(["capture", "--pin", "123456", "--no-sync"])
        .assert()
        .success()
        .stdout(contains("clocked in").and(contains("Queued")));

    k.cmd()
        .args(["capture", "--pin", "123456", "--no-sync"])
        .assert()
        .success()
        .stdout(contains("clocked out"));

    k.go_offline();
    k.cmd()
        .args(["sync"])
        .assert()
        .success()
        .stdout(contains("Sync incomplete").and(contains("Write failed")));

    k.go_online();
    k.cmd()
        .args(["pending"])
        .assert()
        .success()
        .stdout(contains("pending").and(contains("2 event(s)")));

    k.cmd()
        .args(["sync"])
        .assert()
        .success()
        .stdout(contains("Sync completed").and(contains("2 synced")));

    let records = k.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["action"], "clock_in");
    assert_eq!(records[1]["action"], "clock_out");
}

#[test]
fn test_missing_staged_photo_syncs_without_it() {
    let k = kiosk();
    let photo = k.photo.to_string_lossy().to_string();

    k.cmd()
        .args(["capture", "--pin", "123456", "--photo", &photo, "--no-sync"])
        .assert()
        .success();

    for staged in k.staged_photos() {
        std::fs::remove_file(staged).unwrap();
    }

    k.cmd()
        .args(["sync"])
        .assert()
        .success()
        .stdout(contains("Without photo"));

    let records = k.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].get("photoIn").is_none());
}
