//! Report generation command

use std::path::{Path, PathBuf};

use anyhow::Result;

use spendly_core::generate_monthly_report;

use super::{open_db, parse_month_arg};

/// Default reports directory: the platform data dir, or ./reports as a
/// fallback for minimal environments.
fn default_reports_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("spendly").join("reports"))
        .unwrap_or_else(|| PathBuf::from("reports"))
}

pub fn cmd_report(
    db_path: &Path,
    user: &str,
    month: Option<&str>,
    out_dir: Option<&Path>,
    no_encrypt: bool,
) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;
    let user_id = db.ensure_user(user, None)?;
    let month = parse_month_arg(month)?;

    let reports_dir = out_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(default_reports_dir);

    println!("📝 Generating report for {} ({})...", user, month);

    let report = generate_monthly_report(&db, &reports_dir, user_id, month)?;

    println!();
    println!("  Income:      {:>12}", report.total_income.to_string());
    println!("  Expenses:    {:>12}", report.total_expenses.to_string());
    println!("  Investments: {:>12}", report.total_investments.to_string());
    println!("  Savings:     {:>12}", report.total_savings.to_string());
    println!();
    println!("✅ Report written to {}", report.artifact_path);

    Ok(())
}
