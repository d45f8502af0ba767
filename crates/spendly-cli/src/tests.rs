//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use spendly_core::db::Database;
use spendly_core::MonthKey;

use crate::commands::{self, parse_month_arg};

// ========== Argument Parsing ==========

#[test]
fn test_parse_month_arg_defaults_to_current() {
    let month = parse_month_arg(None).unwrap();
    assert_eq!(month, MonthKey::current());
}

#[test]
fn test_parse_month_arg_rejects_garbage() {
    assert!(parse_month_arg(Some("2024-03")).is_ok());
    assert!(parse_month_arg(Some("2024-13")).is_err());
    assert!(parse_month_arg(Some("march")).is_err());
}

// ========== Init / Open ==========

#[test]
fn test_open_db_unencrypted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let db = commands::open_db(&path, true).unwrap();

    // Schema exists
    let conn = db.conn().unwrap();
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='expenses'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_cmd_init_creates_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("init.db");

    commands::cmd_init(&path, true).unwrap();
    assert!(path.exists());
}

// ========== Seed ==========

#[test]
fn test_cmd_seed_populates_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seed.db");

    commands::cmd_seed(&path, "demo", true).unwrap();

    let db = Database::new_unencrypted(path.to_str().unwrap()).unwrap();
    let conn = db.conn().unwrap();
    let expenses: i64 = conn
        .query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))
        .unwrap();
    let investments: i64 = conn
        .query_row("SELECT COUNT(*) FROM investments", [], |row| row.get(0))
        .unwrap();
    let budgets: i64 = conn
        .query_row("SELECT COUNT(*) FROM budgets", [], |row| row.get(0))
        .unwrap();
    assert_eq!(expenses, 6);
    assert_eq!(investments, 3);
    assert_eq!(budgets, 4);

    // Seeding twice must not duplicate budget rows for the same month
    drop(conn);
    drop(db);
    commands::cmd_seed(&path, "demo", true).unwrap();
    let db = Database::new_unencrypted(path.to_str().unwrap()).unwrap();
    let conn = db.conn().unwrap();
    let budgets: i64 = conn
        .query_row("SELECT COUNT(*) FROM budgets", [], |row| row.get(0))
        .unwrap();
    assert_eq!(budgets, 4);
}

// ========== Dashboard / Report ==========

#[test]
fn test_cmd_dashboard_runs_on_empty_month() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dash.db");

    commands::cmd_init(&path, true).unwrap();
    let result = commands::cmd_dashboard(&path, "demo", Some("2024-03"), true);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_report_writes_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.db");
    let out_dir = dir.path().join("reports");

    commands::cmd_seed(&path, "demo", true).unwrap();
    commands::cmd_report(&path, "demo", Some("2024-03"), Some(&out_dir), true).unwrap();

    let artifact = out_dir.join("monthly_report_demo_2024-03.txt");
    assert!(artifact.exists());
    let content = std::fs::read_to_string(artifact).unwrap();
    assert!(content.contains("Monthly Financial Report"));
}

#[test]
fn test_cmd_status_handles_missing_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.db");

    // Should report, not fail, when the file does not exist yet
    assert!(commands::cmd_status(&path, true).is_ok());
}
