//! Profile handlers

use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};

use spendly_core::models::Profile;
use spendly_core::ProfileUpdate;

use super::resolve_owner;
use crate::{AppError, AppState};

/// GET /api/profile - The caller's profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Profile>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    Ok(Json(state.db.get_or_create_profile(user_id)?))
}

/// PUT /api/profile - Partial profile update; omitted fields are unchanged
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, AppError> {
    let user_id = resolve_owner(&state, &headers)?;
    Ok(Json(state.db.update_profile(user_id, &update)?))
}
