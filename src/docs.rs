// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::get_my_permissions,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Permissions (overrides por usuário) ---
        handlers::permissions::get_user_permissions,
        handlers::permissions::replace_user_permissions,
        handlers::permissions::delete_user_permission,

        // --- Roles ---
        handlers::rbac::list_roles,
        handlers::rbac::get_role,
        handlers::rbac::create_role,
        handlers::rbac::update_role,
        handlers::rbac::delete_role,
        handlers::rbac::get_role_permissions,
        handlers::rbac::replace_role_permissions,

        // --- Modules ---
        handlers::modules::list_modules,
        handlers::modules::create_module,
        handlers::modules::update_module,
        handlers::modules::delete_module,

        // --- Settings ---
        handlers::settings::list_settings,
        handlers::settings::get_setting,
        handlers::settings::update_setting,

        // --- Activity Logs ---
        handlers::activity::list_activity_logs,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::MeResponse,

            // --- Users ---
            models::users::CreateUserPayload,
            models::users::UpdateUserPayload,

            // --- RBAC ---
            models::rbac::AdminModule,
            models::rbac::Role,
            models::rbac::Permission,
            models::rbac::Action,
            models::rbac::PermissionSource,
            models::rbac::RolePermission,
            models::rbac::UserPermission,
            models::rbac::EffectivePermission,
            models::rbac::PermissionEntry,
            models::rbac::ReplacePermissionsPayload,
            models::rbac::CreateRolePayload,
            models::rbac::UpdateRolePayload,
            models::rbac::RoleResponse,
            models::rbac::CreateModulePayload,
            models::rbac::UpdateModulePayload,
            handlers::permissions::UserPermissionsResponse,

            // --- Settings ---
            models::settings::Setting,
            models::settings::UpdateSettingRequest,

            // --- Activity Logs ---
            models::activity::ActivityLog,
            models::activity::ActivityLogPage,
        )
    ),
    tags(
        (name = "Auth", description = "Login e dados do usuário logado"),
        (name = "Users", description = "Gestão de Usuários"),
        (name = "Permissions", description = "Overrides de permissão por usuário"),
        (name = "Roles", description = "Cargos e suas matrizes de permissão"),
        (name = "Modules", description = "Módulos do painel"),
        (name = "Settings", description = "Configurações do sistema"),
        (name = "Activity Logs", description = "Histórico de alterações")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
