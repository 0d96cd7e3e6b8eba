// src/handlers/auth.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::{AuthResponse, LoginUserPayload, MeResponse},
        rbac::EffectivePermission,
    },
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login realizado", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "E-mail ou senha inválidos"),
        (status = 403, description = "Conta desativada")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let response = app_state.auth_service
        .login_user(payload.email.trim(), &payload.password)
        .await?;

    Ok(Json(response))
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário logado e seu cargo", body = MeResponse),
        (status = 401, description = "Token inválido ou ausente")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<MeResponse>, AppError> {
    Ok(Json(app_state.user_service.describe(user).await?))
}

// GET /api/auth/me/permissions (o que o frontend usa para montar o menu)
#[utoipa::path(
    get,
    path = "/api/auth/me/permissions",
    tag = "Auth",
    responses(
        (status = 200, description = "Permissões efetivas do usuário logado", body = Vec<EffectivePermission>),
        (status = 401, description = "Token inválido ou ausente")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_permissions(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<EffectivePermission>>, AppError> {
    let resolved = app_state.permission_service.effective_for_user(&user).await?;
    Ok(Json(resolved.into_values().collect()))
}
