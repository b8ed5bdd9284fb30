//! Admin dashboard endpoints.

use axum::{extract::State, Json};
use std::sync::Arc;

use super::auth::AdminUser;
use super::error::ApiError;
use crate::db::AdminStats;
use crate::AppState;

/// Number of activity entries shown on the dashboard
const RECENT_ACTIVITY_LIMIT: i64 = 10;

/// GET /api/admin/stats
pub async fn stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<Json<AdminStats>, ApiError> {
    Ok(Json(AdminStats::collect(&state.db, RECENT_ACTIVITY_LIMIT).await?))
}
