//! Analytics and monthly summary handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use spendly_core::{Analytics, MonthlySummary};

use super::{parse_month, resolve_owner};
use crate::{AppError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    /// Reference month, "YYYY-MM" (defaults to the current month). The
    /// series covers the 12 months ending here.
    pub month: Option<String>,
}

/// GET /api/analytics - 12-month series and window totals
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<Analytics>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    let reference = parse_month(query.month.as_deref())?;
    Ok(Json(state.db.analytics(user_id, reference)?))
}

/// GET /api/summary/:month - One month's aggregate view
pub async fn get_monthly_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(month): Path<String>,
) -> Result<Json<MonthlySummary>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    let month = parse_month(Some(&month))?;
    Ok(Json(state.db.monthly_summary(user_id, month)?))
}
