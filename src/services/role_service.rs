// src/services/role_service.rs

use serde_json::json;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{ActivityLogRepository, ModuleRepository, RoleRepository, UserRepository},
    models::rbac::{CreateRolePayload, PermissionEntry, Role, RolePermission, RoleResponse, UpdateRolePayload},
    services::permission_service::ensure_valid_entries,
};

#[derive(Clone)]
pub struct RoleService {
    repo: RoleRepository,
    user_repo: UserRepository,
    module_repo: ModuleRepository,
    activity_repo: ActivityLogRepository,
    pool: PgPool,
}

impl RoleService {
    pub fn new(
        repo: RoleRepository,
        user_repo: UserRepository,
        module_repo: ModuleRepository,
        activity_repo: ActivityLogRepository,
        pool: PgPool,
    ) -> Self {
        Self { repo, user_repo, module_repo, activity_repo, pool }
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        self.repo.list().await
    }

    pub async fn get_role(&self, id: i32) -> Result<RoleResponse, AppError> {
        let role = self.find_role(id).await?;
        let permissions = self.repo.list_permissions(&self.pool, id).await?;
        Ok(RoleResponse { role, permissions })
    }

    pub async fn create_role_with_permissions(
        &self,
        actor_id: i32,
        payload: CreateRolePayload,
    ) -> Result<RoleResponse, AppError> {
        ensure_valid_entries(&self.module_repo, &payload.permissions).await?;

        // 1. Inicia Transação
        let mut tx = self.pool.begin().await?;

        // 2. Cria o Cargo
        let role = self.repo
            .create_role(
                &mut *tx,
                payload.name.trim(),
                payload.description.as_deref(),
                payload.is_active.unwrap_or(true),
            )
            .await?;

        // 3. Salva a matriz de permissões
        if !payload.permissions.is_empty() {
            self.repo.insert_permissions(&mut *tx, role.id, &payload.permissions).await?;
        }

        self.activity_repo
            .record(&mut *tx, Some(actor_id), "create", "role", Some(role.id.to_string()), json!({ "name": role.name }))
            .await?;

        let permissions = self.repo.list_permissions(&mut *tx, role.id).await?;

        // 4. Commit
        tx.commit().await?;

        tracing::info!(role_id = role.id, "Cargo criado");
        Ok(RoleResponse { role, permissions })
    }

    pub async fn update_role(&self, actor_id: i32, id: i32, payload: UpdateRolePayload) -> Result<Role, AppError> {
        let mut tx = self.pool.begin().await?;

        let role = self.repo
            .update_role(
                &mut *tx,
                id,
                payload.name.as_deref().map(str::trim),
                payload.description.as_deref(),
                payload.is_active,
            )
            .await?
            .ok_or(AppError::NotFound("Cargo".into()))?;

        self.activity_repo
            .record(&mut *tx, Some(actor_id), "update", "role", Some(id.to_string()), json!({ "name": role.name }))
            .await?;

        tx.commit().await?;
        Ok(role)
    }

    // Cargo em uso não pode ser apagado: os usuários ficariam sem perfil
    pub async fn delete_role(&self, actor_id: i32, id: i32) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let in_use = self.user_repo.count_by_role(&mut *tx, id).await?;
        if in_use > 0 {
            return Err(AppError::Conflict(format!(
                "O cargo ainda está atribuído a {} usuário(s).",
                in_use
            )));
        }

        if !self.repo.delete_role(&mut *tx, id).await? {
            return Err(AppError::NotFound("Cargo".into()));
        }

        self.activity_repo
            .record(&mut *tx, Some(actor_id), "delete", "role", Some(id.to_string()), json!({}))
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_permissions(&self, id: i32) -> Result<Vec<RolePermission>, AppError> {
        self.find_role(id).await?;
        self.repo.list_permissions(&self.pool, id).await
    }

    /// Troca a matriz inteira do cargo (transação).
    pub async fn replace_permissions(
        &self,
        actor_id: i32,
        id: i32,
        entries: Vec<PermissionEntry>,
    ) -> Result<Vec<RolePermission>, AppError> {
        self.find_role(id).await?;
        ensure_valid_entries(&self.module_repo, &entries).await?;

        let mut tx = self.pool.begin().await?;

        self.repo.clear_permissions(&mut *tx, id).await?;
        if !entries.is_empty() {
            self.repo.insert_permissions(&mut *tx, id, &entries).await?;
        }

        self.activity_repo
            .record(
                &mut *tx,
                Some(actor_id),
                "update_permissions",
                "role",
                Some(id.to_string()),
                json!({ "modules": entries.iter().map(|e| e.admin_module_id).collect::<Vec<_>>() }),
            )
            .await?;

        let permissions = self.repo.list_permissions(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(permissions)
    }

    async fn find_role(&self, id: i32) -> Result<Role, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Cargo".into()))
    }
}
