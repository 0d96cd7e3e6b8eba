// src/handlers/permissions.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermUsersEdit, PermUsersView, RequirePermission},
    },
    models::rbac::{EffectivePermission, ReplacePermissionsPayload, UserPermission},
};

// A tela de permissões do usuário mostra as duas coisas lado a lado
#[derive(Debug, Serialize, ToSchema)]
pub struct UserPermissionsResponse {
    pub overrides: Vec<UserPermission>,
    pub effective: Vec<EffectivePermission>,
}

// GET /api/users/{id}/permissions
#[utoipa::path(
    get,
    path = "/api/users/{id}/permissions",
    tag = "Permissions",
    params(("id" = i32, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Overrides e permissões efetivas do usuário", body = UserPermissionsResponse),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user_permissions(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermUsersView>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let overrides = app_state.permission_service.list_user_overrides(id).await?;
    let effective = app_state.permission_service.effective_for_user_id(id).await?;

    Ok(Json(UserPermissionsResponse { overrides, effective }))
}

// PUT /api/users/{id}/permissions
#[utoipa::path(
    put,
    path = "/api/users/{id}/permissions",
    tag = "Permissions",
    params(("id" = i32, Path, description = "ID do usuário")),
    request_body = ReplacePermissionsPayload,
    responses(
        (status = 200, description = "Overrides substituídos", body = UserPermissionsResponse),
        (status = 400, description = "Módulo repetido ou inexistente"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn replace_user_permissions(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermUsersEdit>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<ReplacePermissionsPayload>,
) -> Result<impl IntoResponse, AppError> {
    let overrides = app_state
        .permission_service
        .replace_user_overrides(actor.id, id, payload.permissions)
        .await?;
    let effective = app_state.permission_service.effective_for_user_id(id).await?;

    Ok(Json(UserPermissionsResponse { overrides, effective }))
}

// DELETE /api/users/{id}/permissions/{module_id}
#[utoipa::path(
    delete,
    path = "/api/users/{id}/permissions/{module_id}",
    tag = "Permissions",
    params(
        ("id" = i32, Path, description = "ID do usuário"),
        ("module_id" = i32, Path, description = "ID do módulo")
    ),
    responses(
        (status = 204, description = "Override removido; volta a valer o cargo"),
        (status = 404, description = "Override não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user_permission(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermUsersEdit>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path((id, module_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .permission_service
        .remove_user_override(actor.id, id, module_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
