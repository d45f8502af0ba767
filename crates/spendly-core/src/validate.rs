//! Typed write inputs and validation
//!
//! Form handling happens upstream; by the time data reaches this crate it is
//! already typed. Validation here enforces the domain rules (non-negative
//! amounts, required fields) and reports every violation as a per-field
//! message so callers can render them next to the offending input.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Category, InvestmentType};

/// A single field-level validation message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Collected validation failures. Never fatal; callers surface these to the
/// user and let them retry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Return `Err(Error::Validation)` if any field failed.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

fn check_amount(errors: &mut ValidationErrors, field: &str, amount: Decimal) {
    if amount < Decimal::ZERO {
        errors.push(field, "must not be negative");
    }
}

/// Input for creating or updating an expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    pub category: Category,
    pub amount: Decimal,
    pub description: String,
    /// Defaults to now when omitted; the month key is derived from this.
    pub occurred_at: Option<DateTime<Utc>>,
}

impl NewExpense {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        check_amount(&mut errors, "amount", self.amount);
        if self.description.trim().is_empty() {
            errors.push("description", "is required");
        }
        errors.into_result()
    }
}

/// Input for creating or updating an investment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvestment {
    pub investment_type: InvestmentType,
    pub amount: Decimal,
    pub description: String,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl NewInvestment {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        check_amount(&mut errors, "amount", self.amount);
        if self.description.trim().is_empty() {
            errors.push("description", "is required");
        }
        errors.into_result()
    }
}

/// One category allocation in a budget upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetInput {
    pub category: Category,
    pub allocated_amount: Decimal,
}

impl BudgetInput {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        check_amount(&mut errors, "allocated_amount", self.allocated_amount);
        errors.into_result()
    }
}

/// Profile update input. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub monthly_salary: Option<Decimal>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub profile_picture_path: Option<String>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        if let Some(salary) = self.monthly_salary {
            check_amount(&mut errors, "monthly_salary", salary);
        }
        errors.into_result()
    }
}
