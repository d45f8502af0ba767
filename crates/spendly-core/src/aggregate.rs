//! Monthly aggregation
//!
//! Pure functions that fold one month's records into totals, plus the
//! `Database` entry points that fetch the rows and delegate to them. The
//! arithmetic identities:
//!
//! - income is the profile's monthly salary (zero when unset)
//! - savings = income - expenses - investments, and may go negative
//! - a month with no records still aggregates, to all-zero totals
//!
//! All sums are exact decimal arithmetic.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::error::Result;
use crate::models::{Budget, Category, Expense, Investment, InvestmentType};
use crate::month::MonthKey;

/// Spend in one category during a month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Decimal,
}

/// Invested amount of one type during a month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentTypeTotal {
    pub investment_type: InvestmentType,
    pub total: Decimal,
}

/// One month's aggregate view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: MonthKey,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub total_investments: Decimal,
    /// income - expenses - investments; negative when the month overran
    pub total_savings: Decimal,
    /// Non-empty categories only, largest spend first
    pub expenses_by_category: Vec<CategoryTotal>,
    /// Non-empty types only, largest amount first
    pub investments_by_type: Vec<InvestmentTypeTotal>,
    pub expense_count: usize,
    pub investment_count: usize,
}

/// Budget versus actual spend for one category in one month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetUsage {
    pub category: Category,
    pub month: MonthKey,
    pub allocated: Decimal,
    pub spent: Decimal,
    /// allocated - spent; negative when over budget
    pub remaining: Decimal,
    /// spent / allocated as a percentage, rounded to 2 decimal places.
    /// Zero when nothing was allocated, even if something was spent.
    pub percent_used: Decimal,
}

/// Fold one month's records into a summary. Pure; callers supply the rows.
pub fn summarize_month(
    month: MonthKey,
    salary: Decimal,
    expenses: &[Expense],
    investments: &[Investment],
) -> MonthlySummary {
    let total_expenses: Decimal = expenses.iter().map(|e| e.amount).sum();
    let total_investments: Decimal = investments.iter().map(|i| i.amount).sum();

    let mut by_category: HashMap<Category, Decimal> = HashMap::new();
    for expense in expenses {
        *by_category.entry(expense.category).or_default() += expense.amount;
    }
    let mut expenses_by_category: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, total)| CategoryTotal { category, total })
        .collect();
    expenses_by_category.sort_by(|a, b| b.total.cmp(&a.total).then(a.category.as_str().cmp(b.category.as_str())));

    let mut by_type: HashMap<InvestmentType, Decimal> = HashMap::new();
    for investment in investments {
        *by_type.entry(investment.investment_type).or_default() += investment.amount;
    }
    let mut investments_by_type: Vec<InvestmentTypeTotal> = by_type
        .into_iter()
        .map(|(investment_type, total)| InvestmentTypeTotal {
            investment_type,
            total,
        })
        .collect();
    investments_by_type.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then(a.investment_type.as_str().cmp(b.investment_type.as_str()))
    });

    MonthlySummary {
        month,
        total_income: salary,
        total_expenses,
        total_investments,
        total_savings: salary - total_expenses - total_investments,
        expenses_by_category,
        investments_by_type,
        expense_count: expenses.len(),
        investment_count: investments.len(),
    }
}

/// Evaluate one budget against the month's expenses in its category.
pub fn evaluate_budget(budget: &Budget, category_expenses: &[Expense]) -> BudgetUsage {
    let spent: Decimal = category_expenses.iter().map(|e| e.amount).sum();
    let allocated = budget.allocated_amount;

    let percent_used = if allocated.is_zero() {
        Decimal::ZERO
    } else {
        (spent / allocated * Decimal::ONE_HUNDRED).round_dp(2)
    };

    BudgetUsage {
        category: budget.category,
        month: budget.month_key,
        allocated,
        spent,
        remaining: allocated - spent,
        percent_used,
    }
}

impl Database {
    /// Aggregate one user's month. Months with no records yield all-zero
    /// totals (income still reflects the profile salary).
    pub fn monthly_summary(&self, user_id: i64, month: MonthKey) -> Result<MonthlySummary> {
        let salary = self.monthly_salary(user_id)?;
        let expenses = self.expenses_for_month(user_id, month)?;
        let investments = self.investments_for_month(user_id, month)?;
        Ok(summarize_month(month, salary, &expenses, &investments))
    }

    /// Budget usage for every allocation in a month, in category order.
    pub fn budget_usage(&self, user_id: i64, month: MonthKey) -> Result<Vec<BudgetUsage>> {
        let budgets = self.budgets_for_month(user_id, month)?;
        let expenses = self.expenses_for_month(user_id, month)?;

        Ok(budgets
            .iter()
            .map(|budget| {
                let in_category: Vec<Expense> = expenses
                    .iter()
                    .filter(|e| e.category == budget.category)
                    .cloned()
                    .collect();
                evaluate_budget(budget, &in_category)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn expense(category: Category, amount: Decimal) -> Expense {
        Expense {
            id: 0,
            user_id: 1,
            category,
            amount,
            description: "test".to_string(),
            occurred_at: Utc::now(),
            month_key: "2024-03".parse().unwrap(),
            created_at: Utc::now(),
        }
    }

    fn investment(investment_type: InvestmentType, amount: Decimal) -> Investment {
        Investment {
            id: 0,
            user_id: 1,
            investment_type,
            amount,
            description: "test".to_string(),
            occurred_at: Utc::now(),
            month_key: "2024-03".parse().unwrap(),
            created_at: Utc::now(),
        }
    }

    fn budget(category: Category, allocated: Decimal) -> Budget {
        Budget {
            id: 0,
            user_id: 1,
            category,
            allocated_amount: allocated,
            month_key: "2024-03".parse().unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_savings_identity() {
        let month = "2024-03".parse().unwrap();
        let expenses = vec![
            expense(Category::Food, dec!(700)),
            expense(Category::Bills, dec!(500)),
        ];
        let investments = vec![investment(InvestmentType::Stocks, dec!(800))];

        let summary = summarize_month(month, dec!(5000), &expenses, &investments);
        assert_eq!(summary.total_income, dec!(5000));
        assert_eq!(summary.total_expenses, dec!(1200));
        assert_eq!(summary.total_investments, dec!(800));
        assert_eq!(summary.total_savings, dec!(3000));
    }

    #[test]
    fn test_savings_can_go_negative() {
        let month = "2024-03".parse().unwrap();
        let expenses = vec![expense(Category::Shopping, dec!(1500))];
        let summary = summarize_month(month, dec!(1000), &expenses, &[]);
        assert_eq!(summary.total_savings, dec!(-500));
    }

    #[test]
    fn test_empty_month_aggregates_to_zero() {
        let month = "2024-03".parse().unwrap();
        let summary = summarize_month(month, Decimal::ZERO, &[], &[]);
        assert_eq!(summary.total_income, Decimal::ZERO);
        assert_eq!(summary.total_expenses, Decimal::ZERO);
        assert_eq!(summary.total_investments, Decimal::ZERO);
        assert_eq!(summary.total_savings, Decimal::ZERO);
        assert!(summary.expenses_by_category.is_empty());
        assert!(summary.investments_by_type.is_empty());
    }

    #[test]
    fn test_category_breakdown_sorts_largest_first() {
        let month = "2024-03".parse().unwrap();
        let expenses = vec![
            expense(Category::Food, dec!(100)),
            expense(Category::Bills, dec!(300)),
            expense(Category::Food, dec!(50)),
        ];
        let summary = summarize_month(month, Decimal::ZERO, &expenses, &[]);

        assert_eq!(summary.expenses_by_category.len(), 2);
        assert_eq!(summary.expenses_by_category[0].category, Category::Bills);
        assert_eq!(summary.expenses_by_category[0].total, dec!(300));
        assert_eq!(summary.expenses_by_category[1].total, dec!(150));
    }

    #[test]
    fn test_budget_overspend_goes_negative() {
        let b = budget(Category::Food, dec!(1000));
        let spent = vec![expense(Category::Food, dec!(1200))];

        let usage = evaluate_budget(&b, &spent);
        assert_eq!(usage.spent, dec!(1200));
        assert_eq!(usage.remaining, dec!(-200));
        assert_eq!(usage.percent_used, dec!(120.00));
    }

    #[test]
    fn test_zero_allocation_never_divides() {
        let b = budget(Category::Other, Decimal::ZERO);
        let spent = vec![expense(Category::Other, dec!(42))];

        let usage = evaluate_budget(&b, &spent);
        assert_eq!(usage.percent_used, Decimal::ZERO);
        assert_eq!(usage.remaining, dec!(-42));
    }

    #[test]
    fn test_percent_used_rounds_to_two_places() {
        let b = budget(Category::Food, dec!(300));
        let spent = vec![expense(Category::Food, dec!(100))];

        let usage = evaluate_budget(&b, &spent);
        assert_eq!(usage.percent_used, dec!(33.33));
    }

    #[test]
    fn test_monthly_summary_from_db() {
        use crate::db::Database;
        use crate::validate::{NewExpense, NewInvestment, ProfileUpdate};
        use chrono::TimeZone;

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

        let at = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        db.insert_expense(
            user_id,
            &NewExpense {
                category: Category::Food,
                amount: dec!(1200),
                description: "food for the month".to_string(),
                occurred_at: Some(at),
            },
        )
        .unwrap();
        db.insert_investment(
            user_id,
            &NewInvestment {
                investment_type: InvestmentType::Stocks,
                amount: dec!(800),
                description: "brokerage deposit".to_string(),
                occurred_at: Some(at),
            },
        )
        .unwrap();

        let summary = db
            .monthly_summary(user_id, "2024-03".parse().unwrap())
            .unwrap();
        assert_eq!(summary.total_savings, dec!(3000));
        assert_eq!(summary.expense_count, 1);
        assert_eq!(summary.investment_count, 1);

        // Adjacent month is untouched
        let other = db
            .monthly_summary(user_id, "2024-04".parse().unwrap())
            .unwrap();
        assert_eq!(other.total_expenses, Decimal::ZERO);
        assert_eq!(other.total_savings, dec!(5000));
    }
}
