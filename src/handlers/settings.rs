// src/handlers/settings.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermSettingsEdit, PermSettingsView, RequirePermission},
    },
    models::settings::{Setting, UpdateSettingRequest},
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses((status = 200, description = "Todas as configurações", body = Vec<Setting>)),
    security(("api_jwt" = []))
)]
pub async fn list_settings(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermSettingsView>,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.settings_service.list_settings().await?;
    Ok((StatusCode::OK, Json(settings)))
}

// GET /api/settings/{key}
#[utoipa::path(
    get,
    path = "/api/settings/{key}",
    tag = "Settings",
    params(("key" = String, Path, description = "Chave da configuração")),
    responses(
        (status = 200, description = "Configuração", body = Setting),
        (status = 404, description = "Configuração não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_setting(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermSettingsView>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let setting = app_state.settings_service.get_setting(&key).await?;

    Ok((StatusCode::OK, Json(setting)))
}

// PUT /api/settings/{key}
#[utoipa::path(
    put,
    path = "/api/settings/{key}",
    tag = "Settings",
    params(("key" = String, Path, description = "Chave da configuração")),
    request_body = UpdateSettingRequest,
    responses(
        (status = 200, description = "Configuração gravada", body = Setting),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_setting(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermSettingsEdit>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(key): Path<String>,
    Json(payload): Json<UpdateSettingRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let updated = app_state.settings_service
        .update_setting(actor.id, &key, &payload)
        .await?;

    Ok((StatusCode::OK, Json(updated)))
}
