//! CSV export of raw records

use std::io::Write;

use crate::db::Database;
use crate::error::Result;
use crate::models::RecordFilter;

impl Database {
    /// Write one user's expenses as CSV, newest first.
    pub fn export_expenses_csv<W: Write>(
        &self,
        user_id: i64,
        filter: &RecordFilter,
        out: W,
    ) -> Result<()> {
        let expenses = self.expenses_matching(user_id, filter)?;

        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(["date", "category", "amount", "description"])?;
        for expense in expenses {
            writer.write_record([
                expense.occurred_at.format("%Y-%m-%d").to_string(),
                expense.category.to_string(),
                expense.amount.to_string(),
                expense.description,
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write one user's investments as CSV, newest first.
    pub fn export_investments_csv<W: Write>(
        &self,
        user_id: i64,
        filter: &RecordFilter,
        out: W,
    ) -> Result<()> {
        let investments = self.investments_matching(user_id, filter)?;

        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(["date", "investment_type", "amount", "description"])?;
        for investment in investments {
            writer.write_record([
                investment.occurred_at.format("%Y-%m-%d").to_string(),
                investment.investment_type.to_string(),
                investment.amount.to_string(),
                investment.description,
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}
