use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper function to create a temporary directory for CLI tests
fn create_cli_test_environment() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Helper function to create a Command with --no-color flag for testing
fn seeker_cmd(db_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sk").expect("Failed to find sk binary");
    cmd.arg("--no-color");
    cmd.arg("--state-db");
    cmd.arg(db_path);
    cmd
}

#[test]
fn test_cli_search_by_document_type() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("state.db");

    seeker_cmd(&db_path)
        .args(["search", "find all W2 documents"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 results"))
        .stdout(predicate::str::contains("W2_2024.pdf"))
        .stdout(predicate::str::contains("W2_2023.pdf"));
}

#[test]
fn test_cli_search_unambiguous_folder() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("state.db");

    seeker_cmd(&db_path)
        .args(["search", "list documents in the Tax Documents folder"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 results"))
        .stdout(predicate::str::contains("1099_2024.pdf"));
}

#[test]
fn test_cli_ambiguous_folder_asks_for_clarification() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("state.db");

    seeker_cmd(&db_path)
        .args([
            "search",
            "list documents in the Taxes folder",
            "--thread",
            "t-clarify",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Which one would you like?"))
        .stdout(predicate::str::contains("1. /root/Personal/Taxes"))
        .stdout(predicate::str::contains("2. /root/Business/Taxes"))
        .stdout(predicate::str::contains("sk resume --thread t-clarify"));
}

#[test]
fn test_cli_resume_completes_the_suspended_search() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("state.db");

    seeker_cmd(&db_path)
        .args([
            "search",
            "list documents in the Taxes folder",
            "--thread",
            "t-resume",
        ])
        .assert()
        .success();

    seeker_cmd(&db_path)
        .args(["resume", "--thread", "t-resume", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 result"))
        .stdout(predicate::str::contains("receipt_q1.pdf"));
}

#[test]
fn test_cli_show_suspended_thread() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("state.db");

    seeker_cmd(&db_path)
        .args([
            "search",
            "list documents in the Taxes folder",
            "--thread",
            "t-show",
        ])
        .assert()
        .success();

    seeker_cmd(&db_path)
        .args(["show", "--thread", "t-show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list documents in the Taxes folder"))
        .stdout(predicate::str::contains("Waiting on clarification"));
}

#[test]
fn test_cli_out_of_range_choice_keeps_thread_resumable() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("state.db");

    seeker_cmd(&db_path)
        .args([
            "search",
            "list documents in the Taxes folder",
            "--thread",
            "t-range",
        ])
        .assert()
        .success();

    seeker_cmd(&db_path)
        .args(["resume", "--thread", "t-range", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));

    seeker_cmd(&db_path)
        .args(["resume", "--thread", "t-range", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("invoice_042.pdf"));
}

#[test]
fn test_cli_missing_folder_is_a_terminal_error() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("state.db");

    seeker_cmd(&db_path)
        .args(["search", "list documents in the Archive folder"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot proceed"));
}

#[test]
fn test_cli_unrecognizable_request_is_refused() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("state.db");

    seeker_cmd(&db_path)
        .args(["search", "what is the meaning of paperwork"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no recognizable document type"));
}

#[test]
fn test_cli_resume_unknown_thread_fails() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("state.db");

    seeker_cmd(&db_path)
        .args(["resume", "--thread", "no-such-thread", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No suspended conversation"));
}

#[test]
fn test_cli_empty_result_is_success() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("state.db");

    seeker_cmd(&db_path)
        .args(["search", "find all K1 documents"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No results found."));
}
