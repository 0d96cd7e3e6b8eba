// src/handlers/activity.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rbac::{PermActivityLogsView, RequirePermission},
    models::activity::{ActivityLogPage, ActivityLogQuery},
};

// GET /api/activity-logs
#[utoipa::path(
    get,
    path = "/api/activity-logs",
    tag = "Activity Logs",
    params(ActivityLogQuery),
    responses((status = 200, description = "Página do log de atividades", body = ActivityLogPage)),
    security(("api_jwt" = []))
)]
pub async fn list_activity_logs(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermActivityLogsView>,
    Query(query): Query<ActivityLogQuery>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.activity_service.list(&query).await?))
}
