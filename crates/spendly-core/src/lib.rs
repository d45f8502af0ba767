//! Spendly Core Library
//!
//! Shared functionality for the Spendly personal finance tool:
//! - Database access and migrations (encrypted SQLite)
//! - Expense, investment, budget, and profile stores
//! - Monthly aggregation with exact decimal arithmetic
//! - Rolling analytics over a 12-month window
//! - Monthly report generation with on-disk artifacts
//! - CSV export of raw records

pub mod aggregate;
pub mod analytics;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod month;
pub mod report;
pub mod validate;

pub use aggregate::{
    evaluate_budget, summarize_month, BudgetUsage, CategoryTotal, InvestmentTypeTotal,
    MonthlySummary,
};
pub use analytics::{Analytics, MonthPoint};
pub use db::{Database, ReportTotals};
pub use error::{Error, Result};
pub use models::{
    Budget, Category, Expense, Investment, InvestmentType, MonthlyReport, Profile, RecordFilter,
    User, ALL_CATEGORIES,
};
pub use month::{MonthKey, ANALYTICS_WINDOW};
pub use report::{artifact_file_name, generate_monthly_report};
pub use validate::{
    BudgetInput, FieldError, NewExpense, NewInvestment, ProfileUpdate, ValidationErrors,
};
