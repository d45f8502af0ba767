//! Investment handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;

use spendly_core::models::Investment;
use spendly_core::NewInvestment;

use super::expenses::ListQuery;
use super::resolve_owner;
use crate::{AppError, AppState, SuccessResponse};

#[derive(Serialize)]
pub struct InvestmentListResponse {
    pub investments: Vec<Investment>,
    pub total_amount: Decimal,
}

/// GET /api/investments - List investments with optional filters
pub async fn list_investments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<InvestmentListResponse>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    let filter = query.into_filter();

    let investments = state.db.list_investments(user_id, &filter)?;
    let total_amount = state.db.investment_total(user_id, &filter)?;

    Ok(Json(InvestmentListResponse {
        investments,
        total_amount,
    }))
}

/// POST /api/investments - Create an investment
pub async fn create_investment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<NewInvestment>,
) -> Result<Json<Investment>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    Ok(Json(state.db.insert_investment(user_id, &input)?))
}

/// GET /api/investments/:id - Get a single investment
pub async fn get_investment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Investment>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    Ok(Json(state.db.get_investment(user_id, id)?))
}

/// PUT /api/investments/:id - Update an investment
pub async fn update_investment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<NewInvestment>,
) -> Result<Json<Investment>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    Ok(Json(state.db.update_investment(user_id, id, &input)?))
}

/// DELETE /api/investments/:id - Delete an investment
pub async fn delete_investment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    state.db.delete_investment(user_id, id)?;
    Ok(Json(SuccessResponse { success: true }))
}
