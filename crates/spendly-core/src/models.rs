//! Domain models for Spendly

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::month::MonthKey;

/// A registered user. Authentication itself happens upstream; this row only
/// anchors record ownership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-user profile. `monthly_salary` supplies the income side of every
/// aggregation; a missing or zero salary is valid and simply yields zero
/// income.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub monthly_salary: Decimal,
    pub phone_number: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: String,
    pub profile_picture_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Expense categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Bills,
    Entertainment,
    Healthcare,
    Education,
    Other,
}

/// All categories, in display order. Used by budget management and seeding.
pub const ALL_CATEGORIES: [Category; 8] = [
    Category::Food,
    Category::Transport,
    Category::Shopping,
    Category::Bills,
    Category::Entertainment,
    Category::Healthcare,
    Category::Education,
    Category::Other,
];

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Shopping => "Shopping",
            Self::Bills => "Bills",
            Self::Entertainment => "Entertainment",
            Self::Healthcare => "Healthcare",
            Self::Education => "Education",
            Self::Other => "Other",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Food" => Ok(Self::Food),
            "Transport" => Ok(Self::Transport),
            "Shopping" => Ok(Self::Shopping),
            "Bills" => Ok(Self::Bills),
            "Entertainment" => Ok(Self::Entertainment),
            "Healthcare" => Ok(Self::Healthcare),
            "Education" => Ok(Self::Education),
            "Other" => Ok(Self::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Investment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvestmentType {
    Stocks,
    #[serde(rename = "Mutual Funds")]
    MutualFunds,
    #[serde(rename = "Real Estate")]
    RealEstate,
    Savings,
    Crypto,
    Other,
}

impl InvestmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stocks => "Stocks",
            Self::MutualFunds => "Mutual Funds",
            Self::RealEstate => "Real Estate",
            Self::Savings => "Savings",
            Self::Crypto => "Crypto",
            Self::Other => "Other",
        }
    }
}

impl std::str::FromStr for InvestmentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Stocks" => Ok(Self::Stocks),
            "Mutual Funds" => Ok(Self::MutualFunds),
            "Real Estate" => Ok(Self::RealEstate),
            "Savings" => Ok(Self::Savings),
            "Crypto" => Ok(Self::Crypto),
            "Other" => Ok(Self::Other),
            _ => Err(format!("Unknown investment type: {}", s)),
        }
    }
}

impl std::fmt::Display for InvestmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An expense record. `month_key` is recomputed from `occurred_at` on every
/// write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub category: Category,
    pub amount: Decimal,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub month_key: MonthKey,
    pub created_at: DateTime<Utc>,
}

/// An investment record, same shape as an expense with a type instead of a
/// category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investment {
    pub id: i64,
    pub user_id: i64,
    pub investment_type: InvestmentType,
    pub amount: Decimal,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub month_key: MonthKey,
    pub created_at: DateTime<Utc>,
}

/// A monthly budget allocation. At most one row per (user, category, month).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category: Category,
    pub allocated_amount: Decimal,
    pub month_key: MonthKey,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A persisted month-end snapshot. At most one row per (user, month);
/// regeneration replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub id: i64,
    pub user_id: i64,
    pub month_key: MonthKey,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub total_investments: Decimal,
    pub total_savings: Decimal,
    pub artifact_path: String,
    pub generated_at: DateTime<Utc>,
}

/// Filter for listing expense or investment records.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Category name ("Food") or investment type name ("Stocks")
    pub kind: Option<String>,
    /// Inclusive start date
    pub from: Option<NaiveDate>,
    /// Inclusive end date
    pub to: Option<NaiveDate>,
    /// Case-insensitive description substring
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl RecordFilter {
    pub fn for_page(limit: i64, offset: i64) -> Self {
        Self {
            limit,
            offset,
            ..Default::default()
        }
    }
}
