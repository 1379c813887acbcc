//! CLI integration tests
//!
//! Drive the `pagenode` binary against a database in a temporary directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn db_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("data").join("store.db")
}

fn pagenode(temp_dir: &TempDir, db: &Path, args: &[&str]) -> Output {
    let cli_bin = env!("CARGO_BIN_EXE_pagenode");
    Command::new(cli_bin)
        .current_dir(temp_dir.path())
        .arg("--db")
        .arg(db)
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "CLI command should succeed. Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_cli_init_creates_database() {
    let temp_dir = TempDir::new().unwrap();
    let db = db_path(&temp_dir);

    let output = pagenode(&temp_dir, &db, &["init"]);

    assert_success(&output);
    assert!(db.exists());
    let conn = Connection::open(&db).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_cli_edit_draft_then_publish() {
    // Given: A root page
    let temp_dir = TempDir::new().unwrap();
    let db = db_path(&temp_dir);
    let output = pagenode(
        &temp_dir,
        &db,
        &["add", "--title", "Home", "--content", r#"{"body":"v1"}"#],
    );
    assert_success(&output);
    assert!(stdout(&output).contains("node_id: 1"));

    // When: A draft edit is saved and the page published
    let output = pagenode(
        &temp_dir,
        &db,
        &["edit", "1", "--draft", "--title", "Welcome", "--content", r#"{"body":"v2"}"#],
    );
    assert_success(&output);
    assert!(stdout(&output).contains("draft: true"));

    let output = pagenode(&temp_dir, &db, &["publish", "1"]);
    assert_success(&output);
    assert!(stdout(&output).contains("is online"));

    // Then: The page shows the draft and its checkpointed history
    let output = pagenode(&temp_dir, &db, &["show", "1"]);
    assert_success(&output);
    let shown = stdout(&output);
    assert!(shown.contains("title: Welcome"));
    assert!(shown.contains("online: true"));
    assert!(shown.contains("draft_version_id: 1"));

    let output = pagenode(&temp_dir, &db, &["versions", "1"]);
    assert_success(&output);
    assert_eq!(stdout(&output).matches(" owner=admin ").count(), 2);
}

#[test]
fn test_cli_revert_rejects_bad_version_id() {
    let temp_dir = TempDir::new().unwrap();
    let db = db_path(&temp_dir);
    assert_success(&pagenode(&temp_dir, &db, &["add", "--title", "Home"]));

    let output = pagenode(&temp_dir, &db, &["revert", "1", "abc"]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_cli_delete_cascades() {
    let temp_dir = TempDir::new().unwrap();
    let db = db_path(&temp_dir);
    assert_success(&pagenode(&temp_dir, &db, &["add", "--title", "Root"]));
    assert_success(&pagenode(
        &temp_dir,
        &db,
        &["add", "--parent", "1", "--title", "Child"],
    ));

    let output = pagenode(&temp_dir, &db, &["delete", "1"]);

    assert_success(&output);
    assert!(stdout(&output).contains("Deleted 2 node(s): 1, 2"));
    let output = pagenode(&temp_dir, &db, &["show", "2"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_check_reports_broken_slots() {
    // Given: A valid database
    let temp_dir = TempDir::new().unwrap();
    let db = db_path(&temp_dir);
    assert_success(&pagenode(&temp_dir, &db, &["add", "--title", "Home"]));
    assert_success(&pagenode(&temp_dir, &db, &["edit", "1", "--draft"]));

    let output = pagenode(&temp_dir, &db, &["check"]);
    assert_success(&output);
    assert!(stdout(&output).contains("Checked 1 translation(s)"));

    // When: The draft slot is pointed at the public version
    let conn = Connection::open(&db).unwrap();
    conn.execute(
        "UPDATE node_translations SET draft_version_id = public_version_id",
        [],
    )
    .unwrap();
    drop(conn);

    // Then: check fails
    let output = pagenode(&temp_dir, &db, &["check"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed validation"));
}
