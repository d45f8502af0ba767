//! Investment operations
//!
//! Same ownership and month-key rules as expenses; see `db::expenses`.

use chrono::Utc;
use rusqlite::params;
use rust_decimal::Decimal;

use super::expenses::{effective_limit, filter_clauses};
use super::{parse_amount, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Investment, RecordFilter};
use crate::month::MonthKey;
use crate::validate::NewInvestment;

const INVESTMENT_COLUMNS: &str =
    "id, user_id, investment_type, amount, description, occurred_at, month_key, created_at";

type RawInvestment = (i64, i64, String, String, String, String, String, String);

fn raw_investment(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawInvestment> {
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

fn investment_from_raw(raw: RawInvestment) -> Result<Investment> {
    let (id, user_id, investment_type, amount, description, occurred_at, month_key, created_at) =
        raw;
    Ok(Investment {
        id,
        user_id,
        investment_type: investment_type.parse().map_err(Error::Invalid)?,
        amount: parse_amount(&amount)?,
        description,
        occurred_at: parse_datetime(&occurred_at),
        month_key: month_key.parse()?,
        created_at: parse_datetime(&created_at),
    })
}

impl Database {
    /// Insert an investment, deriving the month key from the timestamp.
    pub fn insert_investment(&self, user_id: i64, input: &NewInvestment) -> Result<Investment> {
        input.validate()?;

        let occurred_at = input.occurred_at.unwrap_or_else(Utc::now);
        let month_key = MonthKey::from_datetime(&occurred_at);

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO investments (user_id, investment_type, amount, description, occurred_at, month_key)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                user_id,
                input.investment_type.as_str(),
                input.amount.to_string(),
                input.description,
                occurred_at.to_rfc3339(),
                month_key.to_string(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        drop(conn);
        self.get_investment(user_id, id)
    }

    /// Update an investment owned by `user_id`, recomputing the month key.
    pub fn update_investment(
        &self,
        user_id: i64,
        id: i64,
        input: &NewInvestment,
    ) -> Result<Investment> {
        input.validate()?;

        let occurred_at = input.occurred_at.unwrap_or_else(Utc::now);
        let month_key = MonthKey::from_datetime(&occurred_at);

        let conn = self.conn()?;
        let changed = conn.execute(
            r#"
            UPDATE investments
            SET investment_type = ?3, amount = ?4, description = ?5, occurred_at = ?6, month_key = ?7
            WHERE id = ?1 AND user_id = ?2
            "#,
            params![
                id,
                user_id,
                input.investment_type.as_str(),
                input.amount.to_string(),
                input.description,
                occurred_at.to_rfc3339(),
                month_key.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(Error::NotFound(format!("Investment not found: {}", id)));
        }
        drop(conn);
        self.get_investment(user_id, id)
    }

    /// Delete an investment owned by `user_id`.
    pub fn delete_investment(&self, user_id: i64, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM investments WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Investment not found: {}", id)));
        }
        Ok(())
    }

    /// Fetch a single investment owned by `user_id`.
    pub fn get_investment(&self, user_id: i64, id: i64) -> Result<Investment> {
        let conn = self.conn()?;
        let raw = conn
            .query_row(
                &format!(
                    "SELECT {} FROM investments WHERE id = ?1 AND user_id = ?2",
                    INVESTMENT_COLUMNS
                ),
                params![id, user_id],
                raw_investment,
            )
            .map_err(|_| Error::NotFound(format!("Investment not found: {}", id)))?;
        investment_from_raw(raw)
    }

    /// List investments with optional filters, newest first.
    pub fn list_investments(&self, user_id: i64, filter: &RecordFilter) -> Result<Vec<Investment>> {
        let conn = self.conn()?;

        let (conditions, mut query_params) = filter_clauses("investment_type", user_id, filter);

        let sql = format!(
            "SELECT {} FROM investments WHERE {} ORDER BY occurred_at DESC, id DESC LIMIT ? OFFSET ?",
            INVESTMENT_COLUMNS, conditions
        );
        query_params.push(Box::new(effective_limit(filter.limit)));
        query_params.push(Box::new(filter.offset.max(0)));

        let param_refs: Vec<&dyn rusqlite::ToSql> =
            query_params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs.as_slice(), raw_investment)?;

        let mut investments = Vec::new();
        for row in rows {
            investments.push(investment_from_raw(row?)?);
        }
        Ok(investments)
    }

    /// Every investment matching the filter, without pagination. Used by the
    /// CSV export.
    pub(crate) fn investments_matching(
        &self,
        user_id: i64,
        filter: &RecordFilter,
    ) -> Result<Vec<Investment>> {
        let conn = self.conn()?;

        let (conditions, query_params) = filter_clauses("investment_type", user_id, filter);
        let sql = format!(
            "SELECT {} FROM investments WHERE {} ORDER BY occurred_at DESC, id DESC",
            INVESTMENT_COLUMNS, conditions
        );

        let param_refs: Vec<&dyn rusqlite::ToSql> =
            query_params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs.as_slice(), raw_investment)?;

        let mut investments = Vec::new();
        for row in rows {
            investments.push(investment_from_raw(row?)?);
        }
        Ok(investments)
    }

    /// Exact total over every investment matching the filter, ignoring
    /// pagination.
    pub fn investment_total(&self, user_id: i64, filter: &RecordFilter) -> Result<Decimal> {
        let conn = self.conn()?;

        let (conditions, query_params) = filter_clauses("investment_type", user_id, filter);
        let sql = format!("SELECT amount FROM investments WHERE {}", conditions);

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

    /// All of one owner's investments in a month, newest first.
    pub fn investments_for_month(&self, user_id: i64, month: MonthKey) -> Result<Vec<Investment>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM investments WHERE user_id = ?1 AND month_key = ?2 \
             ORDER BY occurred_at DESC, id DESC",
            INVESTMENT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![user_id, month.to_string()], raw_investment)?;

        let mut investments = Vec::new();
        for row in rows {
            investments.push(investment_from_raw(row?)?);
        }
        Ok(investments)
    }
}
