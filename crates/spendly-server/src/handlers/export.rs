//! CSV export handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};

use super::expenses::ListQuery;
use super::resolve_owner;
use crate::{AppError, AppState};

fn csv_response(file_name: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response()
}

/// GET /api/export/expenses - Expenses as CSV (filters apply, no pagination)
pub async fn export_expenses(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    let filter = query.into_filter();

    let mut buf = Vec::new();
    state.db.export_expenses_csv(user_id, &filter, &mut buf)?;
    Ok(csv_response("expenses.csv", buf))
}

/// GET /api/export/investments - Investments as CSV
pub async fn export_investments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Response, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    let filter = query.into_filter();

    let mut buf = Vec::new();
    state.db.export_investments_csv(user_id, &filter, &mut buf)?;
    Ok(csv_response("investments.csv", buf))
}
