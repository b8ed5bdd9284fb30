//! Activity log endpoint and the helper handlers use to record changes.

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use super::auth::AdminUser;
use super::error::ApiError;
use crate::db::{list_activity, log_activity, Activity, ActivityQuery, Page};
use crate::AppState;

/// Record a content change. Failures are logged and never fail the request.
pub async fn record_activity(
    state: &AppState,
    action: &str,
    resource_type: &str,
    resource_id: Option<&str>,
    resource_name: Option<&str>,
    user_id: Option<&str>,
) {
    if let Err(e) = log_activity(
        &state.db,
        action,
        resource_type,
        resource_id,
        resource_name,
        user_id,
    )
    .await
    {
        tracing::warn!(
            action = action,
            resource_type = resource_type,
            error = %e,
            "Failed to record activity"
        );
    }
}

/// GET /api/admin/activity
///
/// Query parameters: `action`, `resource_type`, `page` (1-indexed),
/// `per_page` (default 50, max 100).
pub async fn list(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Page<Activity>>, ApiError> {
    Ok(Json(list_activity(&state.db, &query).await?))
}
