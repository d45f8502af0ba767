//! Monthly report handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use spendly_core::models::MonthlyReport;
use spendly_core::{generate_monthly_report, MonthKey};

use super::{parse_month, resolve_owner};
use crate::{AppError, AppState};

/// GET /api/reports - All generated reports, newest month first
pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<MonthlyReport>>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    Ok(Json(state.db.list_reports(user_id)?))
}

/// Request body for generating a report
#[derive(Debug, Default, Deserialize)]
pub struct GenerateReportRequest {
    /// Month to snapshot, "YYYY-MM" (defaults to the current month)
    pub month: Option<String>,
}

/// POST /api/reports - Generate (or regenerate) a month's report
pub async fn generate_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<GenerateReportRequest>,
) -> Result<Json<MonthlyReport>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    let month = parse_month(req.month.as_deref())?;

    let report = generate_monthly_report(&state.db, &state.reports_dir, user_id, month)?;
    Ok(Json(report))
}

/// GET /api/reports/:month - One month's report row
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(month): Path<String>,
) -> Result<Json<MonthlyReport>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    let month: MonthKey = parse_month(Some(&month))?;

    state
        .db
        .get_report(user_id, month)?
        .map(Json)
        .ok_or_else(|| AppError::not_found(&format!("No report for {}", month)))
}

/// GET /api/reports/:month/artifact - The rendered text artifact
pub async fn get_report_artifact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(month): Path<String>,
) -> Result<Response, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    let month: MonthKey = parse_month(Some(&month))?;

    let report = state
        .db
        .get_report(user_id, month)?
        .ok_or_else(|| AppError::not_found(&format!("No report for {}", month)))?;

    let content = std::fs::read_to_string(&report.artifact_path)
        .map_err(|_| AppError::not_found("Report artifact is missing; regenerate the report"))?;

    let file_name = std::path::Path::new(&report.artifact_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("report_{}.txt", month));

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        content,
    )
        .into_response())
}
