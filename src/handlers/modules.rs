// src/handlers/modules.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermModulesCreate, PermModulesDelete, PermModulesEdit, PermModulesView, RequirePermission},
    },
    models::rbac::{AdminModule, CreateModulePayload, UpdateModulePayload},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModuleListQuery {
    /// Só os módulos ativos
    #[serde(default)]
    pub active_only: bool,
}

// GET /api/modules
#[utoipa::path(
    get,
    path = "/api/modules",
    tag = "Modules",
    params(ModuleListQuery),
    responses((status = 200, description = "Lista de módulos", body = Vec<AdminModule>)),
    security(("api_jwt" = []))
)]
pub async fn list_modules(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermModulesView>,
    Query(query): Query<ModuleListQuery>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(app_state.module_service.list_modules(query.active_only).await?))
}

// POST /api/modules
#[utoipa::path(
    post,
    path = "/api/modules",
    tag = "Modules",
    request_body = CreateModulePayload,
    responses(
        (status = 201, description = "Módulo criado", body = AdminModule),
        (status = 409, description = "Já existe um módulo com esse nome")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_module(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermModulesCreate>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<CreateModulePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let module = app_state.module_service.create_module(actor.id, payload).await?;
    Ok((StatusCode::CREATED, Json(module)))
}

// PUT /api/modules/{id}
#[utoipa::path(
    put,
    path = "/api/modules/{id}",
    tag = "Modules",
    params(("id" = i32, Path, description = "ID do módulo")),
    request_body = UpdateModulePayload,
    responses(
        (status = 200, description = "Módulo atualizado", body = AdminModule),
        (status = 404, description = "Módulo não encontrado"),
        (status = 409, description = "Módulo do sistema não pode ser renomeado nem desativado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_module(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermModulesEdit>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateModulePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    Ok(Json(app_state.module_service.update_module(actor.id, id, payload).await?))
}

// DELETE /api/modules/{id}
#[utoipa::path(
    delete,
    path = "/api/modules/{id}",
    tag = "Modules",
    params(("id" = i32, Path, description = "ID do módulo")),
    responses(
        (status = 204, description = "Módulo removido (e suas permissões)"),
        (status = 404, description = "Módulo não encontrado"),
        (status = 409, description = "Módulo do sistema não pode ser excluído")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_module(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermModulesDelete>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    app_state.module_service.delete_module(actor.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
