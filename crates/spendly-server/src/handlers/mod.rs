//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::{get_username, AppError, AppState};

pub mod analytics;
pub mod auth;
pub mod budgets;
pub mod dashboard;
pub mod expenses;
pub mod export;
pub mod investments;
pub mod profile;
pub mod reports;

// Re-export all handlers for use in router
pub use analytics::*;
pub use auth::*;
pub use budgets::*;
pub use dashboard::*;
pub use expenses::*;
pub use export::*;
pub use investments::*;
pub use profile::*;
pub use reports::*;

/// Resolve the request's identity to a user id, creating the user row on
/// first sight. Every handler scopes its queries by this id.
pub(crate) fn resolve_owner(state: &Arc<AppState>, headers: &HeaderMap) -> Result<i64, AppError> {
    let username = get_username(headers);
    Ok(state.db.ensure_user(&username, None)?)
}

/// Parse a `YYYY-MM` month parameter, defaulting to the current month.
pub(crate) fn parse_month(
    raw: Option<&str>,
) -> Result<spendly_core::MonthKey, AppError> {
    match raw {
        Some(s) => s
            .parse()
            .map_err(|_| AppError::bad_request(&format!("Invalid month: {}", s))),
        None => Ok(spendly_core::MonthKey::current()),
    }
}
