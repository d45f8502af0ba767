//! Identity handlers

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};

use spendly_core::models::User;

use super::resolve_owner;
use crate::{AppError, AppState};

/// GET /api/me - The identity the request resolves to
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<User>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    Ok(Json(state.db.get_user(user_id)?))
}
