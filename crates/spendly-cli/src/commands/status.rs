//! Status and dashboard command implementations

use std::path::Path;

use anyhow::Result;

use spendly_core::models::RecordFilter;

use super::{open_db, parse_month_arg};

pub fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    use spendly_core::db::DB_KEY_ENV;
    use std::fs;

    println!();
    println!("📊 Spendly Status");
    println!("   ─────────────────────────────────────────────────────────────");

    // Database path
    println!("   Database: {}", db_path.display());

    // Check if database file exists and get size
    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    // Check encryption status
    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    // Try to open the database and show record counts
    if db_path.exists() {
        match open_db(db_path, no_encrypt) {
            Ok(db) => {
                let conn = db.conn()?;
                let users: i64 =
                    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
                let expenses: i64 =
                    conn.query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))?;
                let investments: i64 =
                    conn.query_row("SELECT COUNT(*) FROM investments", [], |row| row.get(0))?;
                let reports: i64 =
                    conn.query_row("SELECT COUNT(*) FROM monthly_reports", [], |row| row.get(0))?;

                println!();
                println!("   Users: {}", users);
                println!("   Expenses: {}", expenses);
                println!("   Investments: {}", investments);
                println!("   Reports: {}", reports);
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {}", e);
                if !no_encrypt && !has_key {
                    println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
                } else if has_key {
                    println!("      (Check if {} is correct)", DB_KEY_ENV);
                }
            }
        }
    }

    println!();
    Ok(())
}

pub fn cmd_dashboard(
    db_path: &Path,
    user: &str,
    month: Option<&str>,
    no_encrypt: bool,
) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;
    let user_id = db.ensure_user(user, None)?;
    let month = parse_month_arg(month)?;

    let summary = db.monthly_summary(user_id, month)?;
    let budgets = db.budget_usage(user_id, month)?;

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│          💰 Spendly Dashboard           │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  User:  {}", user);
    println!("  Month: {}", month);
    println!();
    println!("  Income:      {:>12}", summary.total_income.to_string());
    println!("  Expenses:    {:>12}", summary.total_expenses.to_string());
    println!(
        "  Investments: {:>12}",
        summary.total_investments.to_string()
    );
    println!("  Savings:     {:>12}", summary.total_savings.to_string());

    if !summary.expenses_by_category.is_empty() {
        println!();
        println!("  Spending by category:");
        for entry in &summary.expenses_by_category {
            println!("    {:<15} {:>12}", entry.category, entry.total.to_string());
        }
    }

    if !budgets.is_empty() {
        println!();
        println!("  Budgets:");
        for usage in &budgets {
            let marker = if usage.remaining.is_sign_negative() {
                "⚠️"
            } else {
                "  "
            };
            println!(
                "    {:<15} {:>10} / {:<10} ({}%) {}",
                usage.category, usage.spent, usage.allocated, usage.percent_used, marker
            );
        }
    }

    // Recent activity
    let recent = db.list_expenses(user_id, &RecordFilter::for_page(5, 0))?;
    if !recent.is_empty() {
        println!();
        println!("  Recent expenses:");
        for expense in &recent {
            println!(
                "    {} {:<15} {:>10}  {}",
                expense.occurred_at.format("%Y-%m-%d"),
                expense.category,
                expense.amount,
                expense.description
            );
        }
    }

    println!();
    Ok(())
}
