//! Demo data seeding

use std::path::Path;

use anyhow::Result;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use spendly_core::models::{Category, InvestmentType};
use spendly_core::{BudgetInput, MonthKey, NewExpense, NewInvestment, ProfileUpdate};

use super::open_db;

pub fn cmd_seed(db_path: &Path, user: &str, no_encrypt: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;
    let user_id = db.ensure_user(user, None)?;

    println!("🌱 Seeding demo data for {}...", user);

    db.update_profile(
        user_id,
        &ProfileUpdate {
            full_name: Some("Demo User".to_string()),
            monthly_salary: Some(dec!(5000)),
            ..Default::default()
        },
    )?;

    let now = Utc::now();
    let expenses: [(Category, Decimal, &str, i64); 6] = [
        (Category::Food, dec!(420.50), "Groceries", 2),
        (Category::Bills, dec!(1100), "Rent", 5),
        (Category::Transport, dec!(85.20), "Fuel", 8),
        (Category::Entertainment, dec!(45.99), "Streaming services", 12),
        (Category::Food, dec!(62.30), "Dinner out", 40),
        (Category::Healthcare, dec!(130), "Dentist", 70),
    ];
    for (category, amount, description, days_ago) in expenses {
        db.insert_expense(
            user_id,
            &NewExpense {
                category,
                amount,
                description: description.to_string(),
                occurred_at: Some(now - Duration::days(days_ago)),
            },
        )?;
    }

    let investments: [(InvestmentType, Decimal, &str, i64); 3] = [
        (InvestmentType::MutualFunds, dec!(500), "Index fund SIP", 3),
        (InvestmentType::Stocks, dec!(300), "Brokerage deposit", 15),
        (InvestmentType::Savings, dec!(200), "Emergency fund", 45),
    ];
    for (investment_type, amount, description, days_ago) in investments {
        db.insert_investment(
            user_id,
            &NewInvestment {
                investment_type,
                amount,
                description: description.to_string(),
                occurred_at: Some(now - Duration::days(days_ago)),
            },
        )?;
    }

    let month = MonthKey::current();
    let budgets: [(Category, Decimal); 4] = [
        (Category::Food, dec!(600)),
        (Category::Bills, dec!(1200)),
        (Category::Transport, dec!(150)),
        (Category::Entertainment, dec!(100)),
    ];
    for (category, allocated_amount) in budgets {
        db.upsert_budget(
            user_id,
            month,
            &BudgetInput {
                category,
                allocated_amount,
            },
        )?;
    }

    println!("   6 expenses, 3 investments, 4 budgets, salary set");
    println!("✅ Done. Try: spendly dashboard --user {}", user);

    Ok(())
}
