//! Monthly report generation
//!
//! Renders a month's aggregate view into a plain-text artifact on disk and
//! records a snapshot row pointing at it. Generation is idempotent: running
//! it again for the same (user, month) rewrites the artifact and replaces the
//! row, never accumulating duplicates.
//!
//! The artifact is written to a temp file in the reports directory and
//! persisted into place, so a crash mid-write can never leave a half-written
//! file at the final path.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::aggregate::{BudgetUsage, MonthlySummary};
use crate::db::{Database, ReportTotals};
use crate::error::{Error, Result};
use crate::models::MonthlyReport;
use crate::month::MonthKey;

/// File name of the artifact for one (user, month) snapshot.
pub fn artifact_file_name(username: &str, month: MonthKey) -> String {
    format!("monthly_report_{}_{}.txt", username, month)
}

fn render_report(username: &str, summary: &MonthlySummary, budgets: &[BudgetUsage]) -> String {
    let mut out = String::new();
    // Infallible: writing to a String cannot fail
    let _ = writeln!(out, "Monthly Financial Report");
    let _ = writeln!(out, "========================");
    let _ = writeln!(out, "User:  {}", username);
    let _ = writeln!(out, "Month: {}", summary.month);
    let _ = writeln!(out);
    let _ = writeln!(out, "Total Income:      {}", summary.total_income);
    let _ = writeln!(out, "Total Expenses:    {}", summary.total_expenses);
    let _ = writeln!(out, "Total Investments: {}", summary.total_investments);
    let _ = writeln!(out, "Total Savings:     {}", summary.total_savings);

    if !summary.expenses_by_category.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Expenses by Category");
        let _ = writeln!(out, "--------------------");
        for entry in &summary.expenses_by_category {
            let _ = writeln!(out, "{:<15} {}", entry.category, entry.total);
        }
    }

    if !summary.investments_by_type.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Investments by Type");
        let _ = writeln!(out, "-------------------");
        for entry in &summary.investments_by_type {
            let _ = writeln!(out, "{:<15} {}", entry.investment_type, entry.total);
        }
    }

    if !budgets.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Budget Usage");
        let _ = writeln!(out, "------------");
        for usage in budgets {
            let _ = writeln!(
                out,
                "{:<15} spent {} of {} ({}% used, {} remaining)",
                usage.category, usage.spent, usage.allocated, usage.percent_used, usage.remaining
            );
        }
    }

    out
}

/// Generate (or regenerate) the report for one user's month.
///
/// Aggregates the month, writes the text artifact under `reports_dir`, and
/// upserts the snapshot row. If the row write fails after the artifact was
/// persisted, the artifact is removed so disk and database stay consistent.
pub fn generate_monthly_report(
    db: &Database,
    reports_dir: &Path,
    user_id: i64,
    month: MonthKey,
) -> Result<MonthlyReport> {
    let user = db.get_user(user_id)?;
    let previous = db.get_report(user_id, month)?;
    let summary = db.monthly_summary(user_id, month)?;
    let budgets = db.budget_usage(user_id, month)?;

    std::fs::create_dir_all(reports_dir)?;

    let final_path: PathBuf = reports_dir.join(artifact_file_name(&user.username, month));
    let rendered = render_report(&user.username, &summary, &budgets);

    let mut tmp = NamedTempFile::new_in(reports_dir)?;
    tmp.write_all(rendered.as_bytes())?;
    tmp.persist(&final_path)
        .map_err(|e| Error::Report(format!("Failed to persist report artifact: {}", e)))?;

    let artifact_path = final_path.to_string_lossy().into_owned();
    let totals = ReportTotals {
        income: summary.total_income,
        expenses: summary.total_expenses,
        investments: summary.total_investments,
        savings: summary.total_savings,
    };

    let report = match db.upsert_report(user_id, month, &totals, &artifact_path) {
        Ok(report) => report,
        Err(e) => {
            // Keep disk consistent with the database: a first generation has
            // no row to satisfy, so drop the orphan artifact. On regeneration
            // the old row survives and references this path, so the artifact
            // must stay.
            if previous.is_none() {
                let _ = std::fs::remove_file(&final_path);
            }
            return Err(e);
        }
    };

    info!(
        user = %user.username,
        month = %month,
        artifact = %artifact_path,
        "Generated monthly report"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::validate::{NewExpense, ProfileUpdate};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn seeded_db() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        let user_id = db.ensure_user("alice", None).unwrap();
        db.update_profile(
            user_id,
            &ProfileUpdate {
                monthly_salary: Some(dec!(5000)),
                ..Default::default()
            },
        )
        .unwrap();
        db.insert_expense(
            user_id,
            &NewExpense {
                category: Category::Food,
                amount: dec!(1200),
                description: "food".to_string(),
                occurred_at: Some(Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()),
            },
        )
        .unwrap();
        (db, user_id)
    }

    #[test]
    fn test_generate_writes_artifact_and_row() {
        let (db, user_id) = seeded_db();
        let dir = tempfile::tempdir().unwrap();
        let month: MonthKey = "2024-03".parse().unwrap();

        let report = generate_monthly_report(&db, dir.path(), user_id, month).unwrap();
        assert_eq!(report.total_income, dec!(5000));
        assert_eq!(report.total_expenses, dec!(1200));
        assert_eq!(report.total_savings, dec!(3800));

        let content = std::fs::read_to_string(&report.artifact_path).unwrap();
        assert!(content.contains("Month: 2024-03"));
        assert!(content.contains("Total Savings:     3800"));
        assert!(content.contains("Food"));

        assert!(report
            .artifact_path
            .ends_with("monthly_report_alice_2024-03.txt"));
    }

    #[test]
    fn test_regeneration_replaces_not_duplicates() {
        let (db, user_id) = seeded_db();
        let dir = tempfile::tempdir().unwrap();
        let month: MonthKey = "2024-03".parse().unwrap();

        let first = generate_monthly_report(&db, dir.path(), user_id, month).unwrap();

        db.insert_expense(
            user_id,
            &NewExpense {
                category: Category::Bills,
                amount: dec!(100),
                description: "late bill".to_string(),
                occurred_at: Some(Utc.with_ymd_and_hms(2024, 3, 28, 12, 0, 0).unwrap()),
            },
        )
        .unwrap();

        let second = generate_monthly_report(&db, dir.path(), user_id, month).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.total_expenses, dec!(1300));
        assert_eq!(db.list_reports(user_id).unwrap().len(), 1);

        // Only one artifact exists for the month
        let artifacts: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_name()
                    .to_string_lossy()
                    .starts_with("monthly_report_")
            })
            .collect();
        assert_eq!(artifacts.len(), 1);
    }

    #[test]
    fn test_failed_regeneration_keeps_row_and_artifact() {
        let (db, user_id) = seeded_db();
        let dir = tempfile::tempdir().unwrap();
        let month: MonthKey = "2024-03".parse().unwrap();

        let first = generate_monthly_report(&db, dir.path(), user_id, month).unwrap();

        // Make the snapshot row update fail mid-regeneration
        db.conn()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER block_report_updates BEFORE UPDATE ON monthly_reports \
                 BEGIN SELECT RAISE(ABORT, 'updates disabled'); END;",
            )
            .unwrap();

        assert!(generate_monthly_report(&db, dir.path(), user_id, month).is_err());

        // The old row survives and its artifact is still on disk
        let survivor = db.get_report(user_id, month).unwrap().unwrap();
        assert_eq!(survivor.id, first.id);
        assert!(std::path::Path::new(&survivor.artifact_path).exists());
    }

    #[test]
    fn test_failed_first_generation_leaves_no_artifact() {
        let (db, user_id) = seeded_db();
        let dir = tempfile::tempdir().unwrap();
        let month: MonthKey = "2024-03".parse().unwrap();

        db.conn()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER block_report_inserts BEFORE INSERT ON monthly_reports \
                 BEGIN SELECT RAISE(ABORT, 'inserts disabled'); END;",
            )
            .unwrap();

        assert!(generate_monthly_report(&db, dir.path(), user_id, month).is_err());

        // No row, and no orphan artifact either
        assert!(db.get_report(user_id, month).unwrap().is_none());
        let artifact = dir.path().join(artifact_file_name("alice", month));
        assert!(!artifact.exists());
    }

    #[test]
    fn test_empty_month_report_is_all_zero() {
        let db = Database::in_memory().unwrap();
        let user_id = db.ensure_user("bob", None).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let report =
            generate_monthly_report(&db, dir.path(), user_id, "2024-01".parse().unwrap()).unwrap();
        assert_eq!(report.total_income, dec!(0));
        assert_eq!(report.total_savings, dec!(0));
        let content = std::fs::read_to_string(&report.artifact_path).unwrap();
        assert!(content.contains("Total Expenses:    0"));
    }
}
