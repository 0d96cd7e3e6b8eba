// src/models/rbac.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::validation::validate_not_blank;

// Módulos criados pela migração inicial. As rotas do painel são
// protegidas por estes nomes, então eles não podem sumir nem mudar.
pub const MODULE_USERS: &str = "Users";
pub const MODULE_ROLES: &str = "Roles";
pub const MODULE_MODULES: &str = "Modules";
pub const MODULE_SETTINGS: &str = "Settings";
pub const MODULE_ACTIVITY_LOGS: &str = "Activity Logs";

pub const BUILT_IN_MODULES: [&str; 5] =
    [MODULE_USERS, MODULE_ROLES, MODULE_MODULES, MODULE_SETTINGS, MODULE_ACTIVITY_LOGS];

// ---
// 1. Module (A "Área Funcional" do painel)
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AdminModule {
    #[schema(example = 1)]
    pub id: i32,

    #[schema(example = "Users")]
    pub name: String,

    #[schema(example = "Administração")]
    pub category: Option<String>,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminModule {
    pub fn is_built_in(&self) -> bool {
        BUILT_IN_MODULES.iter().any(|name| name.eq_ignore_ascii_case(&self.name))
    }
}

// ---
// 2. Role (O "Tipo de Usuário")
// ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Role {
    #[schema(example = 1)]
    pub id: i32,

    #[schema(example = "Gerente")]
    pub name: String,

    #[schema(example = "Pode gerir usuários, mas não cargos")]
    pub description: Option<String>,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// As quatro capacidades independentes sobre um módulo.
///
/// No banco as colunas têm o prefixo `can_` (`create` e `delete` são palavras reservadas).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[schema(example = json!({"view": true, "create": false, "edit": true, "delete": false}))]
pub struct Permission {
    #[sqlx(rename = "can_view")]
    pub view: bool,
    #[sqlx(rename = "can_create")]
    pub create: bool,
    #[sqlx(rename = "can_edit")]
    pub edit: bool,
    #[sqlx(rename = "can_delete")]
    pub delete: bool,
}

impl Permission {
    pub const fn none() -> Self {
        Self { view: false, create: false, edit: false, delete: false }
    }

    pub const fn all() -> Self {
        Self { view: true, create: true, edit: true, delete: true }
    }

    pub const fn allows(&self, action: Action) -> bool {
        match action {
            Action::View => self.view,
            Action::Create => self.create,
            Action::Edit => self.edit,
            Action::Delete => self.delete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

impl Action {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }
}

/// De onde veio a permissão efetiva de um módulo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PermissionSource {
    Role,
    User,
}

// O que sai do banco (Tabela user_type_permissions)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct RolePermission {
    pub user_type_id: i32,
    pub admin_module_id: i32,
    #[sqlx(flatten)]
    pub permissions: Permission,
}

// O que sai do banco (Tabela user_permissions) - o "override" individual
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct UserPermission {
    pub user_id: i32,
    pub admin_module_id: i32,
    #[sqlx(flatten)]
    pub permissions: Permission,
}

/// Permissão calculada a cada requisição. Nunca é persistida.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EffectivePermission {
    #[schema(example = 1)]
    pub admin_module_id: i32,
    pub permissions: Permission,
    pub source: PermissionSource,
    pub effective_permissions: Permission,
}

// ---
// Payloads
// ---

// Uma linha da matriz de permissões enviada pelo frontend
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PermissionEntry {
    #[schema(example = 1)]
    pub admin_module_id: i32,
    pub permissions: Permission,
}

// Substitui a matriz inteira (de um cargo ou de um usuário)
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplacePermissionsPayload {
    pub permissions: Vec<PermissionEntry>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRolePayload {
    #[validate(length(min = 1, max = 100, message = "O nome do cargo deve ter entre 1 e 100 caracteres."))]
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Auxiliar")]
    pub name: String,

    #[schema(example = "Apenas visualiza usuários")]
    pub description: Option<String>,

    pub is_active: Option<bool>,

    #[serde(default)]
    pub permissions: Vec<PermissionEntry>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRolePayload {
    #[validate(length(min = 1, max = 100, message = "O nome do cargo deve ter entre 1 e 100 caracteres."))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

// Resposta completa (Cargo + Matriz de Permissões)
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleResponse {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<RolePermission>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateModulePayload {
    #[validate(length(min = 1, max = 100, message = "O nome do módulo deve ter entre 1 e 100 caracteres."))]
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Reports")]
    pub name: String,

    #[schema(example = "Relatórios")]
    pub category: Option<String>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateModulePayload {
    #[validate(length(min = 1, max = 100, message = "O nome do módulo deve ter entre 1 e 100 caracteres."))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_allows_checks_each_flag_independently() {
        let perm = Permission { view: true, create: false, edit: true, delete: false };
        assert!(perm.allows(Action::View));
        assert!(!perm.allows(Action::Create));
        assert!(perm.allows(Action::Edit));
        assert!(!perm.allows(Action::Delete));
    }

    #[test]
    fn test_none_and_all() {
        assert_eq!(Permission::none(), Permission::default());
        for action in [Action::View, Action::Create, Action::Edit, Action::Delete] {
            assert!(!Permission::none().allows(action));
            assert!(Permission::all().allows(action));
        }
    }

    #[test]
    fn test_effective_permission_wire_format() {
        let perm = Permission { view: true, create: false, edit: true, delete: false };
        let effective = EffectivePermission {
            admin_module_id: 3,
            permissions: perm,
            source: PermissionSource::User,
            effective_permissions: perm,
        };

        let value = serde_json::to_value(&effective).unwrap();
        assert_eq!(
            value,
            json!({
                "admin_module_id": 3,
                "permissions": {"view": true, "create": false, "edit": true, "delete": false},
                "source": "user",
                "effective_permissions": {"view": true, "create": false, "edit": true, "delete": false}
            })
        );
    }

    #[test]
    fn test_replace_payload_parses() {
        let payload: ReplacePermissionsPayload = serde_json::from_value(json!({
            "permissions": [
                {"admin_module_id": 2, "permissions": {"view": true, "create": true, "edit": false, "delete": false}}
            ]
        }))
        .unwrap();

        assert_eq!(payload.permissions.len(), 1);
        assert_eq!(payload.permissions[0].admin_module_id, 2);
        assert!(payload.permissions[0].permissions.create);
    }

    #[test]
    fn test_create_role_payload_rejects_empty_name() {
        let payload = CreateRolePayload {
            name: String::new(),
            description: None,
            is_active: None,
            permissions: vec![],
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_whitespace_names_are_rejected() {
        let role = CreateRolePayload {
            name: "   ".into(),
            description: None,
            is_active: None,
            permissions: vec![],
        };
        assert!(role.validate().unwrap_err().field_errors().contains_key("name"));

        let update = UpdateModulePayload { name: Some(" \t ".into()), category: None, is_active: None };
        assert!(update.validate().unwrap_err().field_errors().contains_key("name"));

        let module = CreateModulePayload { name: " Relatórios ".into(), category: None, is_active: None };
        assert!(module.validate().is_ok());
    }
}
