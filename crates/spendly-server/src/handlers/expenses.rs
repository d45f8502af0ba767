//! Expense handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use spendly_core::models::{Expense, RecordFilter};
use spendly_core::NewExpense;

use super::resolve_owner;
use crate::{AppError, AppState, SuccessResponse};

/// Query parameters for listing records
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Category name (expenses) or investment type (investments)
    pub kind: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListQuery {
    pub(crate) fn into_filter(self) -> RecordFilter {
        RecordFilter {
            kind: self.kind,
            from: self.from,
            to: self.to,
            search: self.search,
            limit: self.limit.unwrap_or(0),
            offset: self.offset.unwrap_or(0),
        }
    }
}

/// Listing response: the page plus the unpaged total
#[derive(Serialize)]
pub struct ExpenseListResponse {
    pub expenses: Vec<Expense>,
    pub total_amount: Decimal,
}

/// GET /api/expenses - List expenses with optional filters
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<ExpenseListResponse>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    let filter = query.into_filter();

    let expenses = state.db.list_expenses(user_id, &filter)?;
    let total_amount = state.db.expense_total(user_id, &filter)?;

    Ok(Json(ExpenseListResponse {
        expenses,
        total_amount,
    }))
}

/// POST /api/expenses - Create an expense
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<NewExpense>,
) -> Result<Json<Expense>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    Ok(Json(state.db.insert_expense(user_id, &input)?))
}

/// GET /api/expenses/:id - Get a single expense
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Expense>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    Ok(Json(state.db.get_expense(user_id, id)?))
}

/// PUT /api/expenses/:id - Update an expense
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<NewExpense>,
) -> Result<Json<Expense>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    Ok(Json(state.db.update_expense(user_id, id, &input)?))
}

/// DELETE /api/expenses/:id - Delete an expense
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    state.db.delete_expense(user_id, id)?;
    Ok(Json(SuccessResponse { success: true }))
}
