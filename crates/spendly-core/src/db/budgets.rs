//! Budget operations
//!
//! Budgets are keyed by (user, category, month); setting an allocation for an
//! existing key replaces the amount rather than adding a second row.

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_amount, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::Budget;
use crate::month::MonthKey;
use crate::validate::BudgetInput;

const BUDGET_COLUMNS: &str =
    "id, user_id, category, allocated_amount, month_key, created_at, updated_at";

type RawBudget = (i64, i64, String, String, String, String, String);

fn raw_budget(row: &Row<'_>) -> rusqlite::Result<RawBudget> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn budget_from_raw(raw: RawBudget) -> Result<Budget> {
    let (id, user_id, category, allocated_amount, month_key, created_at, updated_at) = raw;
    Ok(Budget {
        id,
        user_id,
        category: category.parse().map_err(Error::Invalid)?,
        allocated_amount: parse_amount(&allocated_amount)?,
        month_key: month_key.parse()?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

impl Database {
    /// Set the allocation for a category in a month. Replaces any existing
    /// allocation for the same (user, category, month).
    pub fn upsert_budget(
        &self,
        user_id: i64,
        month: MonthKey,
        input: &BudgetInput,
    ) -> Result<Budget> {
        input.validate()?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO budgets (user_id, category, allocated_amount, month_key)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id, category, month_key)
            DO UPDATE SET allocated_amount = excluded.allocated_amount,
                          updated_at = CURRENT_TIMESTAMP
            "#,
            params![
                user_id,
                input.category.as_str(),
                input.allocated_amount.to_string(),
                month.to_string(),
            ],
        )?;

        let raw = conn.query_row(
            &format!(
                "SELECT {} FROM budgets WHERE user_id = ?1 AND category = ?2 AND month_key = ?3",
                BUDGET_COLUMNS
            ),
            params![user_id, input.category.as_str(), month.to_string()],
            raw_budget,
        )?;
        budget_from_raw(raw)
    }

    /// Delete one budget allocation.
    pub fn delete_budget(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM budgets WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Budget not found: {}", id)));
        }
        Ok(())
    }

    /// All budget allocations for a month, ordered by category.
    pub fn budgets_for_month(&self, user_id: i64, month: MonthKey) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM budgets WHERE user_id = ?1 AND month_key = ?2 ORDER BY category",
            BUDGET_COLUMNS
        ))?;
        let rows = stmt.query_map(params![user_id, month.to_string()], raw_budget)?;

        let mut budgets = Vec::new();
        for row in rows {
            budgets.push(budget_from_raw(row?)?);
        }
        Ok(budgets)
    }

    /// The most recent month that has any budget allocation, if any.
    /// Month keys sort chronologically as text, so MAX works directly.
    pub fn latest_budget_month(&self, user_id: i64) -> Result<Option<MonthKey>> {
        let conn = self.conn()?;
        let latest: Option<String> = conn
            .query_row(
                "SELECT MAX(month_key) FROM budgets WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?
            .flatten();
        latest.map(|m| m.parse()).transpose()
    }

    /// Pick the month to show budgets for: the requested month when given,
    /// otherwise the current month, falling back to the most recently
    /// budgeted month when the current one has no allocations yet.
    pub fn resolve_budget_month(
        &self,
        user_id: i64,
        requested: Option<MonthKey>,
    ) -> Result<MonthKey> {
        if let Some(month) = requested {
            return Ok(month);
        }

        let current = MonthKey::current();
        if !self.budgets_for_month(user_id, current)?.is_empty() {
            return Ok(current);
        }
        Ok(self.latest_budget_month(user_id)?.unwrap_or(current))
    }
}
