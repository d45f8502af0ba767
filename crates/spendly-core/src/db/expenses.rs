//! Expense operations
//!
//! All queries are scoped by owner id. Writes derive the month key from the
//! record timestamp so it can never disagree with `occurred_at`, including
//! updates that move a record into a different month.

use chrono::Utc;
use rusqlite::params;
use rust_decimal::Decimal;

use super::{parse_amount, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Expense, RecordFilter};
use crate::month::MonthKey;
use crate::validate::NewExpense;

/// Default and maximum page sizes for record listings
const DEFAULT_PAGE_LIMIT: i64 = 50;
const MAX_PAGE_LIMIT: i64 = 1000;

const EXPENSE_COLUMNS: &str =
    "id, user_id, category, amount, description, occurred_at, month_key, created_at";

type RawExpense = (i64, i64, String, String, String, String, String, String);

fn raw_expense(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawExpense> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn expense_from_raw(raw: RawExpense) -> Result<Expense> {
    let (id, user_id, category, amount, description, occurred_at, month_key, created_at) = raw;
    Ok(Expense {
        id,
        user_id,
        category: category.parse().map_err(Error::Invalid)?,
        amount: parse_amount(&amount)?,
        description,
        occurred_at: parse_datetime(&occurred_at),
        month_key: month_key.parse()?,
        created_at: parse_datetime(&created_at),
    })
}

pub(crate) fn effective_limit(limit: i64) -> i64 {
    if limit <= 0 {
        DEFAULT_PAGE_LIMIT
    } else {
        limit.min(MAX_PAGE_LIMIT)
    }
}

/// Build the WHERE clause and bound parameters shared by listing and totals.
/// `kind_column` is the column the `kind` filter matches against.
pub(crate) fn filter_clauses(
    kind_column: &str,
    user_id: i64,
    filter: &RecordFilter,
) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let mut conditions = vec!["user_id = ?".to_string()];
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

    if let Some(kind) = &filter.kind {
        conditions.push(format!("{} = ?", kind_column));
        params.push(Box::new(kind.clone()));
    }
    if let Some(from) = filter.from {
        conditions.push("date(occurred_at) >= ?".to_string());
        params.push(Box::new(from.to_string()));
    }
    if let Some(to) = filter.to {
        conditions.push("date(occurred_at) <= ?".to_string());
        params.push(Box::new(to.to_string()));
    }
    if let Some(search) = &filter.search {
        conditions.push("description LIKE ? ESCAPE '\\'".to_string());
        let escaped = search
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        params.push(Box::new(format!("%{}%", escaped)));
    }

    (conditions.join(" AND "), params)
}

impl Database {
    /// Insert an expense, deriving the month key from the timestamp.
    pub fn insert_expense(&self, user_id: i64, input: &NewExpense) -> Result<Expense> {
        input.validate()?;

        let occurred_at = input.occurred_at.unwrap_or_else(Utc::now);
        let month_key = MonthKey::from_datetime(&occurred_at);

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO expenses (user_id, category, amount, description, occurred_at, month_key)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                user_id,
                input.category.as_str(),
                input.amount.to_string(),
                input.description,
                occurred_at.to_rfc3339(),
                month_key.to_string(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        drop(conn);
        self.get_expense(user_id, id)
    }

    /// Update an expense owned by `user_id`. The month key is recomputed from
    /// the (possibly changed) timestamp.
    pub fn update_expense(&self, user_id: i64, id: i64, input: &NewExpense) -> Result<Expense> {
        input.validate()?;

        let occurred_at = input.occurred_at.unwrap_or_else(Utc::now);
        let month_key = MonthKey::from_datetime(&occurred_at);

        let conn = self.conn()?;
        let changed = conn.execute(
            r#"
            UPDATE expenses
            SET category = ?3, amount = ?4, description = ?5, occurred_at = ?6, month_key = ?7
            WHERE id = ?1 AND user_id = ?2
            "#,
            params![
                id,
                user_id,
                input.category.as_str(),
                input.amount.to_string(),
                input.description,
                occurred_at.to_rfc3339(),
                month_key.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(Error::NotFound(format!("Expense not found: {}", id)));
        }
        drop(conn);
        self.get_expense(user_id, id)
    }

    /// Delete an expense owned by `user_id`.
    pub fn delete_expense(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM expenses WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Expense not found: {}", id)));
        }
        Ok(())
    }

    /// Fetch a single expense owned by `user_id`. A row owned by someone else
    /// is indistinguishable from a missing one.
    pub fn get_expense(&self, user_id: i64, id: i64) -> Result<Expense> {
        let conn = self.conn()?;
        let raw = conn
            .query_row(
                &format!(
                    "SELECT {} FROM expenses WHERE id = ?1 AND user_id = ?2",
                    EXPENSE_COLUMNS
                ),
                params![id, user_id],
                raw_expense,
            )
            .map_err(|_| Error::NotFound(format!("Expense not found: {}", id)))?;
        expense_from_raw(raw)
    }

    /// List expenses with optional filters, newest first.
    pub fn list_expenses(&self, user_id: i64, filter: &RecordFilter) -> Result<Vec<Expense>> {
        let conn = self.conn()?;

        let (conditions, mut query_params) = filter_clauses("category", user_id, filter);

        let sql = format!(
            "SELECT {} FROM expenses WHERE {} ORDER BY occurred_at DESC, id DESC LIMIT ? OFFSET ?",
            EXPENSE_COLUMNS, conditions
        );
        query_params.push(Box::new(effective_limit(filter.limit)));
        query_params.push(Box::new(filter.offset.max(0)));

        let param_refs: Vec<&dyn rusqlite::ToSql> =
            query_params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs.as_slice(), raw_expense)?;

        let mut expenses = Vec::new();
        for row in rows {
            expenses.push(expense_from_raw(row?)?);
        }
        Ok(expenses)
    }

    /// Every expense matching the filter, without pagination. Used by the
    /// CSV export, which must never truncate.
    pub(crate) fn expenses_matching(
        &self,
        user_id: i64,
        filter: &RecordFilter,
    ) -> Result<Vec<Expense>> {
        let conn = self.conn()?;

        let (conditions, query_params) = filter_clauses("category", user_id, filter);
        let sql = format!(
            "SELECT {} FROM expenses WHERE {} ORDER BY occurred_at DESC, id DESC",
            EXPENSE_COLUMNS, conditions
        );

        let param_refs: Vec<&dyn rusqlite::ToSql> =
            query_params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs.as_slice(), raw_expense)?;

        let mut expenses = Vec::new();
        for row in rows {
            expenses.push(expense_from_raw(row?)?);
        }
        Ok(expenses)
    }

    /// Exact total over every expense matching the filter, ignoring
    /// pagination. Summed in Rust; empty sets yield zero.
    pub fn expense_total(&self, user_id: i64, filter: &RecordFilter) -> Result<Decimal> {
        let conn = self.conn()?;

        let (conditions, query_params) = filter_clauses("category", user_id, filter);
        let sql = format!("SELECT amount FROM expenses WHERE {}", conditions);

        let param_refs: Vec<&dyn rusqlite::ToSql> =
            query_params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs.as_slice(), |row| row.get::<_, String>(0))?;

        let mut total = Decimal::ZERO;
        for row in rows {
            total += parse_amount(&row?)?;
        }
        Ok(total)
    }

    /// All of one owner's expenses in a month, newest first.
    pub fn expenses_for_month(&self, user_id: i64, month: MonthKey) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM expenses WHERE user_id = ?1 AND month_key = ?2 \
             ORDER BY occurred_at DESC, id DESC",
            EXPENSE_COLUMNS
        ))?;
        let rows = stmt.query_map(params![user_id, month.to_string()], raw_expense)?;

        let mut expenses = Vec::new();
        for row in rows {
            expenses.push(expense_from_raw(row?)?);
        }
        Ok(expenses)
    }

    /// One owner's expenses for a category within a month (budget evaluation
    /// scope), newest first.
    pub fn expenses_for_category_month(
        &self,
        user_id: i64,
        category: crate::models::Category,
        month: MonthKey,
    ) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM expenses WHERE user_id = ?1 AND category = ?2 AND month_key = ?3 \
             ORDER BY occurred_at DESC, id DESC",
            EXPENSE_COLUMNS
        ))?;
        let rows = stmt.query_map(
            params![user_id, category.as_str(), month.to_string()],
            raw_expense,
        )?;

        let mut expenses = Vec::new();
        for row in rows {
            expenses.push(expense_from_raw(row?)?);
        }
        Ok(expenses)
    }
}
