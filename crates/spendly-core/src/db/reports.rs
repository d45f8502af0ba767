//! Monthly report snapshot rows
//!
//! One row per (user, month). The row stores the aggregate figures at
//! generation time plus the path of the rendered artifact; regeneration
//! replaces the row in place.

use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::{parse_amount, parse_datetime, Database};
use crate::error::Result;
use crate::models::MonthlyReport;
use crate::month::MonthKey;

const REPORT_COLUMNS: &str = "id, user_id, month_key, total_income, total_expenses, \
     total_investments, total_savings, artifact_path, generated_at";

#[allow(clippy::type_complexity)]
type RawReport = (
    i64,
    i64,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
);

fn raw_report(row: &Row<'_>) -> rusqlite::Result<RawReport> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn report_from_raw(raw: RawReport) -> Result<MonthlyReport> {
    let (id, user_id, month_key, income, expenses, investments, savings, artifact, generated_at) =
        raw;
    Ok(MonthlyReport {
        id,
        user_id,
        month_key: month_key.parse()?,
        total_income: parse_amount(&income)?,
        total_expenses: parse_amount(&expenses)?,
        total_investments: parse_amount(&investments)?,
        total_savings: parse_amount(&savings)?,
        artifact_path: artifact,
        generated_at: parse_datetime(&generated_at),
    })
}

/// Aggregate figures persisted alongside the artifact path.
pub struct ReportTotals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub investments: Decimal,
    pub savings: Decimal,
}

impl Database {
    /// Fetch one user's report for a month, if it has been generated.
    pub fn get_report(&self, user_id: i64, month: MonthKey) -> Result<Option<MonthlyReport>> {
        let conn = self.conn()?;
        let raw = conn
            .query_row(
                &format!(
                    "SELECT {} FROM monthly_reports WHERE user_id = ?1 AND month_key = ?2",
                    REPORT_COLUMNS
                ),
                params![user_id, month.to_string()],
                raw_report,
            )
            .optional()?;
        raw.map(report_from_raw).transpose()
    }

    /// All of one user's reports, newest month first.
    pub fn list_reports(&self, user_id: i64) -> Result<Vec<MonthlyReport>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM monthly_reports WHERE user_id = ?1 ORDER BY month_key DESC",
            REPORT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![user_id], raw_report)?;

        let mut reports = Vec::new();
        for row in rows {
            reports.push(report_from_raw(row?)?);
        }
        Ok(reports)
    }

    /// Insert or replace the snapshot row for (user, month).
    pub fn upsert_report(
        &self,
        user_id: i64,
        month: MonthKey,
        totals: &ReportTotals,
        artifact_path: &str,
    ) -> Result<MonthlyReport> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO monthly_reports
                (user_id, month_key, total_income, total_expenses,
                 total_investments, total_savings, artifact_path)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(user_id, month_key)
            DO UPDATE SET total_income = excluded.total_income,
                          total_expenses = excluded.total_expenses,
                          total_investments = excluded.total_investments,
                          total_savings = excluded.total_savings,
                          artifact_path = excluded.artifact_path,
                          generated_at = CURRENT_TIMESTAMP
            "#,
            params![
                user_id,
                month.to_string(),
                totals.income.to_string(),
                totals.expenses.to_string(),
                totals.investments.to_string(),
                totals.savings.to_string(),
                artifact_path,
            ],
        )?;

        let raw = conn.query_row(
            &format!(
                "SELECT {} FROM monthly_reports WHERE user_id = ?1 AND month_key = ?2",
                REPORT_COLUMNS
            ),
            params![user_id, month.to_string()],
            raw_report,
        )?;
        report_from_raw(raw)
    }
}
