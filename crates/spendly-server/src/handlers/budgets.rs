//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use spendly_core::models::Category;
use spendly_core::{BudgetInput, BudgetUsage, MonthKey};

use super::resolve_owner;
use crate::{AppError, AppState, SuccessResponse};

#[derive(Debug, Default, Deserialize)]
pub struct BudgetQuery {
    /// Month to show, "YYYY-MM". Omitted: the current month, falling back to
    /// the most recently budgeted month when the current one is empty.
    pub month: Option<String>,
}

#[derive(Serialize)]
pub struct BudgetsResponse {
    pub month: MonthKey,
    pub budgets: Vec<BudgetUsage>,
    pub total_allocated: Decimal,
    pub total_spent: Decimal,
}

/// GET /api/budgets - Budget usage for a month
pub async fn get_budgets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BudgetQuery>,
) -> Result<Json<BudgetsResponse>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;

    let requested = query
        .month
        .as_deref()
        .map(|s| {
            s.parse::<MonthKey>()
                .map_err(|_| AppError::bad_request(&format!("Invalid month: {}", s)))
        })
        .transpose()?;
    let month = state.db.resolve_budget_month(user_id, requested)?;

    let budgets = state.db.budget_usage(user_id, month)?;
    let total_allocated = budgets.iter().map(|b| b.allocated).sum();
    let total_spent = budgets.iter().map(|b| b.spent).sum();

    Ok(Json(BudgetsResponse {
        month,
        budgets,
        total_allocated,
        total_spent,
    }))
}

/// Request body for setting a budget allocation
#[derive(Debug, Deserialize)]
pub struct SetBudgetRequest {
    pub category: Category,
    pub allocated_amount: Decimal,
    /// Defaults to the current month
    pub month: Option<MonthKey>,
}

/// POST /api/budgets - Set (or replace) one category's allocation
pub async fn set_budget(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<SetBudgetRequest>,
) -> Result<Json<BudgetUsage>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    let month = req.month.unwrap_or_else(MonthKey::current);

    let input = BudgetInput {
        category: req.category,
        allocated_amount: req.allocated_amount,
    };
    let budget = state.db.upsert_budget(user_id, month, &input)?;

    let expenses = state
        .db
        .expenses_for_category_month(user_id, budget.category, month)?;
    Ok(Json(spendly_core::evaluate_budget(&budget, &expenses)))
}

/// DELETE /api/budgets/:id - Remove one allocation
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    state.db.delete_budget(user_id, id)?;
    Ok(Json(SuccessResponse { success: true }))
}
