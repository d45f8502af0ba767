//! Rolling analytics over recent months
//!
//! Builds a fixed-length series (one point per calendar month, oldest first)
//! ending at a reference month. Months without data produce zero points so
//! the series is always exactly as long as the window; a fresh account gets
//! a flat line, not an empty chart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::{CategoryTotal, InvestmentTypeTotal, MonthlySummary};
use crate::db::Database;
use crate::error::Result;
use crate::month::{MonthKey, ANALYTICS_WINDOW};

/// One month's point in the series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthPoint {
    pub month: MonthKey,
    pub income: Decimal,
    pub expenses: Decimal,
    pub investments: Decimal,
    pub savings: Decimal,
}

/// The analytics view over a trailing window of months.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analytics {
    /// Exactly `ANALYTICS_WINDOW` points, oldest first
    pub series: Vec<MonthPoint>,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub total_investments: Decimal,
    pub total_savings: Decimal,
    /// savings / income over the whole window, as a percentage rounded to 2
    /// decimal places. Zero when the window had no income.
    pub savings_rate: Decimal,
    /// Window-wide category breakdown, largest spend first
    pub expenses_by_category: Vec<CategoryTotal>,
    /// Window-wide investment breakdown, largest amount first
    pub investments_by_type: Vec<InvestmentTypeTotal>,
}

fn point_from_summary(summary: &MonthlySummary) -> MonthPoint {
    MonthPoint {
        month: summary.month,
        income: summary.total_income,
        expenses: summary.total_expenses,
        investments: summary.total_investments,
        savings: summary.total_savings,
    }
}

fn merge_totals<K, T>(
    into: &mut Vec<T>,
    from: &[T],
    key: impl Fn(&T) -> K,
    total: impl Fn(&T) -> Decimal,
    set_total: impl Fn(&mut T, Decimal),
) where
    K: PartialEq,
    T: Clone,
{
    for item in from {
        match into.iter_mut().find(|t| key(t) == key(item)) {
            Some(existing) => {
                let sum = total(existing) + total(item);
                set_total(existing, sum);
            }
            None => into.push(item.clone()),
        }
    }
}

impl Database {
    /// Build the analytics view for the `ANALYTICS_WINDOW` months ending at
    /// `reference` inclusive.
    pub fn analytics(&self, user_id: i64, reference: MonthKey) -> Result<Analytics> {
        let window = reference.window_ending(ANALYTICS_WINDOW);

        let mut series = Vec::with_capacity(window.len());
        let mut expenses_by_category: Vec<CategoryTotal> = Vec::new();
        let mut investments_by_type: Vec<InvestmentTypeTotal> = Vec::new();
        let mut total_income = Decimal::ZERO;
        let mut total_expenses = Decimal::ZERO;
        let mut total_investments = Decimal::ZERO;

        for month in window {
            let summary = self.monthly_summary(user_id, month)?;

            total_income += summary.total_income;
            total_expenses += summary.total_expenses;
            total_investments += summary.total_investments;

            merge_totals(
                &mut expenses_by_category,
                &summary.expenses_by_category,
                |t| t.category,
                |t| t.total,
                |t, v| t.total = v,
            );
            merge_totals(
                &mut investments_by_type,
                &summary.investments_by_type,
                |t| t.investment_type,
                |t| t.total,
                |t, v| t.total = v,
            );

            series.push(point_from_summary(&summary));
        }

        expenses_by_category.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then(a.category.as_str().cmp(b.category.as_str()))
        });
        investments_by_type.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then(a.investment_type.as_str().cmp(b.investment_type.as_str()))
        });

        let total_savings = total_income - total_expenses - total_investments;
        let savings_rate = if total_income.is_zero() {
            Decimal::ZERO
        } else {
            (total_savings / total_income * Decimal::ONE_HUNDRED).round_dp(2)
        };

        Ok(Analytics {
            series,
            total_income,
            total_expenses,
            total_investments,
            total_savings,
            savings_rate,
            expenses_by_category,
            investments_by_type,
        })
    }

    /// A shorter expense trend for the dashboard: the last `len` months
    /// ending at `reference`, oldest first.
    pub fn spending_trend(
        &self,
        user_id: i64,
        reference: MonthKey,
        len: usize,
    ) -> Result<Vec<MonthPoint>> {
        let mut points = Vec::with_capacity(len);
        for month in reference.window_ending(len) {
            let summary = self.monthly_summary(user_id, month)?;
            points.push(point_from_summary(&summary));
        }
        Ok(points)
    }
}
