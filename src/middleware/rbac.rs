// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::rbac::{
        Action, MODULE_ACTIVITY_LOGS, MODULE_MODULES, MODULE_ROLES, MODULE_SETTINGS, MODULE_USERS,
    },
};

/// 1. O Trait que define o que é uma Permissão: um módulo + uma ação
pub trait PermissionDef: Send + Sync + 'static {
    fn module() -> &'static str;
    fn action() -> Action;
}

/// 2. O Extractor (Guardião). Precisa rodar depois do `auth_guard`.
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // A. Extrai Usuário
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        // B. Resolve as permissões efetivas (cargo + overrides) e verifica
        let (module, action) = (T::module(), T::action());
        let allowed = app_state
            .permission_service
            .check(&user.0, module, action)
            .await?;

        if !allowed {
            tracing::info!(user_id = user.0.id, module, action = action.as_str(), "⛔ Acesso negado");
            return Err(AppError::Forbidden(format!(
                "Você precisa da permissão '{}' no módulo '{}' para realizar esta ação.",
                action.as_str(),
                module
            )));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permission {
    ($name:ident, $module:expr, $action:expr) => {
        pub struct $name;
        impl PermissionDef for $name {
            fn module() -> &'static str { $module }
            fn action() -> Action { $action }
        }
    };
}

permission!(PermUsersView, MODULE_USERS, Action::View);
permission!(PermUsersCreate, MODULE_USERS, Action::Create);
permission!(PermUsersEdit, MODULE_USERS, Action::Edit);
permission!(PermUsersDelete, MODULE_USERS, Action::Delete);

permission!(PermRolesView, MODULE_ROLES, Action::View);
permission!(PermRolesCreate, MODULE_ROLES, Action::Create);
permission!(PermRolesEdit, MODULE_ROLES, Action::Edit);
permission!(PermRolesDelete, MODULE_ROLES, Action::Delete);

permission!(PermModulesView, MODULE_MODULES, Action::View);
permission!(PermModulesCreate, MODULE_MODULES, Action::Create);
permission!(PermModulesEdit, MODULE_MODULES, Action::Edit);
permission!(PermModulesDelete, MODULE_MODULES, Action::Delete);

permission!(PermSettingsView, MODULE_SETTINGS, Action::View);
permission!(PermSettingsEdit, MODULE_SETTINGS, Action::Edit);

permission!(PermActivityLogsView, MODULE_ACTIVITY_LOGS, Action::View);
