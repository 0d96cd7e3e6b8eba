// src/services/permission_service.rs

use serde_json::json;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{ActivityLogRepository, ModuleRepository, PermissionRepository, RoleRepository, UserRepository},
    models::{
        auth::User,
        rbac::{Action, AdminModule, EffectivePermission, PermissionEntry, Role, RolePermission, UserPermission},
    },
    services::permission_resolver::{find_duplicate_module, is_allowed, resolve_effective_permissions, EffectivePermissions},
};

#[derive(Clone)]
pub struct PermissionService {
    user_repo: UserRepository,
    role_repo: RoleRepository,
    module_repo: ModuleRepository,
    permission_repo: PermissionRepository,
    activity_repo: ActivityLogRepository,
    pool: PgPool,
}

impl PermissionService {
    pub fn new(
        user_repo: UserRepository,
        role_repo: RoleRepository,
        module_repo: ModuleRepository,
        permission_repo: PermissionRepository,
        activity_repo: ActivityLogRepository,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, role_repo, module_repo, permission_repo, activity_repo, pool }
    }

    /// Busca as duas fontes no banco e calcula as permissões efetivas.
    pub async fn effective_for_user(&self, user: &User) -> Result<EffectivePermissions, AppError> {
        let (role, role_permissions) = self.role_of(user).await?;
        let user_permissions = self.permission_repo.list_for_user(user.id).await?;

        Ok(resolve_for_role(role.as_ref(), &role_permissions, &user_permissions))
    }

    // Lista pronta para o JSON (ordenada pelo ID do módulo)
    pub async fn effective_for_user_id(&self, user_id: i32) -> Result<Vec<EffectivePermission>, AppError> {
        let user = self.find_user(user_id).await?;
        let resolved = self.effective_for_user(&user).await?;
        Ok(resolved.into_values().collect())
    }

    /// O usuário pode executar `action` no módulo chamado `module_name`?
    /// Módulo inexistente ou desativado nega o acesso.
    pub async fn check(&self, user: &User, module_name: &str, action: Action) -> Result<bool, AppError> {
        let module = self.module_repo.find_by_name(module_name).await?;
        if !module.as_ref().is_some_and(|m| m.is_active) {
            tracing::warn!(module = module_name, "Módulo ausente ou inativo na verificação de permissão");
            return Ok(false);
        }

        let resolved = self.effective_for_user(user).await?;
        Ok(decide_access(module.as_ref(), &resolved, action))
    }

    pub async fn list_user_overrides(&self, user_id: i32) -> Result<Vec<UserPermission>, AppError> {
        self.find_user(user_id).await?;
        self.permission_repo.list_for_user(user_id).await
    }

    /// Troca todos os overrides do usuário de uma vez (transação).
    pub async fn replace_user_overrides(
        &self,
        actor_id: i32,
        user_id: i32,
        entries: Vec<PermissionEntry>,
    ) -> Result<Vec<UserPermission>, AppError> {
        self.find_user(user_id).await?;
        ensure_valid_entries(&self.module_repo, &entries).await?;

        // 1. Inicia Transação
        let mut tx = self.pool.begin().await?;

        // 2. Apaga a matriz antiga e grava a nova
        self.permission_repo.clear_for_user(&mut *tx, user_id).await?;
        if !entries.is_empty() {
            self.permission_repo.insert_for_user(&mut *tx, user_id, &entries).await?;
        }

        // 3. Log
        self.activity_repo
            .record(
                &mut *tx,
                Some(actor_id),
                "update_permissions",
                "user",
                Some(user_id.to_string()),
                json!({ "modules": entries.iter().map(|e| e.admin_module_id).collect::<Vec<_>>() }),
            )
            .await?;

        // 4. Commit
        tx.commit().await?;

        self.permission_repo.list_for_user(user_id).await
    }

    pub async fn remove_user_override(&self, actor_id: i32, user_id: i32, module_id: i32) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        if !self.permission_repo.delete_one(&mut *tx, user_id, module_id).await? {
            return Err(AppError::NotFound("Override de permissão".into()));
        }

        self.activity_repo
            .record(
                &mut *tx,
                Some(actor_id),
                "remove_permission",
                "user",
                Some(user_id.to_string()),
                json!({ "admin_module_id": module_id }),
            )
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn role_of(&self, user: &User) -> Result<(Option<Role>, Vec<RolePermission>), AppError> {
        let Some(role_id) = user.user_type_id else {
            return Ok((None, Vec::new()));
        };

        match self.role_repo.find_by_id(role_id).await? {
            Some(role) if role.is_active => {
                let permissions = self.role_repo.list_permissions(&self.pool, role_id).await?;
                Ok((Some(role), permissions))
            }
            role => Ok((role, Vec::new())),
        }
    }

    async fn find_user(&self, user_id: i32) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("Usuário".into()))
    }
}

/// Sem cargo, ou cargo desativado: nenhuma permissão vem do cargo.
/// Os overrides valem de qualquer forma.
pub(crate) fn resolve_for_role(
    role: Option<&Role>,
    role_permissions: &[RolePermission],
    user_permissions: &[UserPermission],
) -> EffectivePermissions {
    let role_permissions: &[RolePermission] = match role {
        Some(r) if r.is_active => role_permissions,
        _ => &[],
    };
    resolve_effective_permissions(role_permissions, user_permissions)
}

/// Módulo inexistente ou desativado nega, qualquer que seja a permissão.
pub(crate) fn decide_access(module: Option<&AdminModule>, resolved: &EffectivePermissions, action: Action) -> bool {
    match module {
        Some(m) if m.is_active => is_allowed(resolved, m.id, action),
        _ => false,
    }
}

/// Regras de gravação de uma matriz de permissões (cargo ou usuário):
/// sem módulos repetidos e todos os módulos precisam existir.
pub(crate) async fn ensure_valid_entries(
    module_repo: &ModuleRepository,
    entries: &[PermissionEntry],
) -> Result<(), AppError> {
    if let Some(module_id) = find_duplicate_module(entries) {
        return Err(AppError::BadRequest(format!(
            "O módulo {} aparece mais de uma vez na matriz de permissões.",
            module_id
        )));
    }

    if entries.is_empty() {
        return Ok(());
    }

    let ids: Vec<i32> = entries.iter().map(|e| e.admin_module_id).collect();
    let existing = module_repo.existing_ids(&ids).await?;

    if let Some(missing) = ids.iter().find(|id| !existing.contains(id)) {
        return Err(AppError::BadRequest(format!("O módulo {} não existe.", missing)));
    }

    Ok(())
}
