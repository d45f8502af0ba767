//! Dashboard handler

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use spendly_core::models::{Expense, Investment, RecordFilter};
use spendly_core::{BudgetUsage, MonthKey, MonthPoint, MonthlySummary};

use super::resolve_owner;
use crate::{AppError, AppState};

/// Months shown in the dashboard trend chart
const TREND_MONTHS: usize = 6;

/// Records shown in the dashboard activity feed
const RECENT_RECORDS: i64 = 5;

#[derive(Serialize)]
pub struct DashboardResponse {
    pub month: MonthKey,
    pub summary: MonthlySummary,
    /// Month the budget section reflects; falls back to the most recently
    /// budgeted month when the current one has no allocations
    pub budget_month: MonthKey,
    pub budgets: Vec<BudgetUsage>,
    /// Last six months, oldest first
    pub trend: Vec<MonthPoint>,
    pub recent_expenses: Vec<Expense>,
    pub recent_investments: Vec<Investment>,
}

/// GET /api/dashboard - Current month at a glance
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<DashboardResponse>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    let month = MonthKey::current();

    let summary = state.db.monthly_summary(user_id, month)?;
    let budget_month = state.db.resolve_budget_month(user_id, None)?;
    let budgets = state.db.budget_usage(user_id, budget_month)?;
    let trend = state.db.spending_trend(user_id, month, TREND_MONTHS)?;

    let recent = RecordFilter::for_page(RECENT_RECORDS, 0);
    let recent_expenses = state.db.list_expenses(user_id, &recent)?;
    let recent_investments = state.db.list_investments(user_id, &recent)?;

    Ok(Json(DashboardResponse {
        month,
        summary,
        budget_month,
        budgets,
        trend,
        recent_expenses,
        recent_investments,
    }))
}
