// src/handlers/rbac.rs

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
        rbac::{PermRolesCreate, PermRolesDelete, PermRolesEdit, PermRolesView, RequirePermission},
    },
    models::rbac::{CreateRolePayload, ReplacePermissionsPayload, Role, RolePermission, RoleResponse, UpdateRolePayload},
};

// GET /api/roles
#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "Roles",
    responses((status = 200, description = "Lista de cargos", body = Vec<Role>)),
    security(("api_jwt" = []))
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermRolesView>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.role_service.list_roles().await?))
}

// GET /api/roles/{id}
#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    tag = "Roles",
    params(("id" = i32, Path, description = "ID do cargo")),
    responses(
        (status = 200, description = "Cargo com a matriz de permissões", body = RoleResponse),
        (status = 404, description = "Cargo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_role(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermRolesView>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.role_service.get_role(id).await?))
}

// POST /api/roles
#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "Roles",
    request_body = CreateRolePayload,
    responses(
        (status = 201, description = "Cargo criado", body = RoleResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Já existe um cargo com esse nome")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_role(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermRolesCreate>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<CreateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let response = app_state.role_service
        .create_role_with_permissions(actor.id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

// PUT /api/roles/{id}
#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    tag = "Roles",
    params(("id" = i32, Path, description = "ID do cargo")),
    request_body = UpdateRolePayload,
    responses(
        (status = 200, description = "Cargo atualizado", body = Role),
        (status = 404, description = "Cargo não encontrado"),
        (status = 409, description = "Já existe um cargo com esse nome")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_role(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermRolesEdit>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    Ok(Json(app_state.role_service.update_role(actor.id, id, payload).await?))
}

// DELETE /api/roles/{id}
#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    tag = "Roles",
    params(("id" = i32, Path, description = "ID do cargo")),
    responses(
        (status = 204, description = "Cargo removido"),
        (status = 404, description = "Cargo não encontrado"),
        (status = 409, description = "Cargo ainda atribuído a usuários")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_role(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermRolesDelete>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.role_service.delete_role(actor.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/roles/{id}/permissions
#[utoipa::path(
    get,
    path = "/api/roles/{id}/permissions",
    tag = "Roles",
    params(("id" = i32, Path, description = "ID do cargo")),
    responses(
        (status = 200, description = "Matriz de permissões do cargo", body = Vec<RolePermission>),
        (status = 404, description = "Cargo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_role_permissions(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermRolesView>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.role_service.get_permissions(id).await?))
}

// PUT /api/roles/{id}/permissions
#[utoipa::path(
    put,
    path = "/api/roles/{id}/permissions",
    tag = "Roles",
    params(("id" = i32, Path, description = "ID do cargo")),
    request_body = ReplacePermissionsPayload,
    responses(
        (status = 200, description = "Matriz substituída", body = Vec<RolePermission>),
        (status = 400, description = "Módulo repetido ou inexistente"),
        (status = 404, description = "Cargo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn replace_role_permissions(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermRolesEdit>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<ReplacePermissionsPayload>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = app_state.role_service
        .replace_permissions(actor.id, id, payload.permissions)
        .await?;
    Ok(Json(permissions))
}
