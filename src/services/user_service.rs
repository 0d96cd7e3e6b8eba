// src/services/user_service.rs

use serde_json::json;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{ActivityLogRepository, RoleRepository, UserRepository},
    models::{
        auth::{MeResponse, User},
        users::{CreateUserPayload, UpdateUserPayload},
    },
    services::auth::hash_password,
};

// Cargo com acesso total criado pela migração inicial
const ADMIN_ROLE_NAME: &str = "Administrator";

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    role_repo: RoleRepository,
    activity_repo: ActivityLogRepository,
    pool: PgPool,
}

impl UserService {
    pub fn new(
        repo: UserRepository,
        role_repo: RoleRepository,
        activity_repo: ActivityLogRepository,
        pool: PgPool,
    ) -> Self {
        Self { repo, role_repo, activity_repo, pool }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.repo.list().await
    }

    pub async fn get_user(&self, id: i32) -> Result<User, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Usuário".into()))
    }

    pub async fn describe(&self, user: User) -> Result<MeResponse, AppError> {
        let role = match user.user_type_id {
            Some(role_id) => self.role_repo.find_by_id(role_id).await?,
            None => None,
        };
        Ok(MeResponse { user, role })
    }

    pub async fn create_user(&self, actor_id: i32, payload: CreateUserPayload) -> Result<User, AppError> {
        if let Some(role_id) = payload.user_type_id {
            self.ensure_role_exists(role_id).await?;
        }

        let hashed_password = hash_password(&payload.password).await?;

        let mut tx = self.pool.begin().await?;

        let user = self.repo
            .create_user(
                &mut *tx,
                payload.name.trim(),
                payload.email.trim(),
                &hashed_password,
                payload.user_type_id,
                payload.is_active.unwrap_or(true),
            )
            .await?;

        self.activity_repo
            .record(&mut *tx, Some(actor_id), "create", "user", Some(user.id.to_string()), json!({ "email": user.email }))
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = user.id, "Usuário criado");
        Ok(user)
    }

    pub async fn update_user(&self, actor_id: i32, id: i32, payload: UpdateUserPayload) -> Result<User, AppError> {
        if let Some(role_id) = payload.user_type_id {
            self.ensure_role_exists(role_id).await?;
        }

        let hashed_password = match payload.password.as_deref() {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        let mut tx = self.pool.begin().await?;

        let user = self.repo
            .update_user(
                &mut *tx,
                id,
                payload.name.as_deref().map(str::trim),
                payload.email.as_deref().map(str::trim),
                hashed_password.as_deref(),
                payload.user_type_id,
                payload.clear_user_type,
                payload.is_active,
            )
            .await?
            .ok_or(AppError::NotFound("Usuário".into()))?;

        // A senha nunca vai para o log, só o fato de ter mudado
        self.activity_repo
            .record(
                &mut *tx,
                Some(actor_id),
                "update",
                "user",
                Some(id.to_string()),
                json!({ "password_changed": hashed_password.is_some() }),
            )
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    pub async fn delete_user(&self, actor_id: i32, id: i32) -> Result<(), AppError> {
        if actor_id == id {
            return Err(AppError::Conflict("Você não pode excluir a sua própria conta.".into()));
        }

        let mut tx = self.pool.begin().await?;

        if !self.repo.delete_user(&mut *tx, id).await? {
            return Err(AppError::NotFound("Usuário".into()));
        }

        self.activity_repo
            .record(&mut *tx, Some(actor_id), "delete", "user", Some(id.to_string()), json!({}))
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Cria o primeiro administrador quando a tabela de usuários está vazia.
    /// Retorna `true` se criou.
    pub async fn bootstrap_admin(&self, email: &str, password: &str) -> Result<bool, AppError> {
        if self.repo.count().await? > 0 {
            return Ok(false);
        }

        let role = self.role_repo
            .find_by_name(ADMIN_ROLE_NAME)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Cargo '{}' não encontrado; a migração inicial rodou?", ADMIN_ROLE_NAME))?;

        let hashed_password = hash_password(password).await?;

        let mut tx = self.pool.begin().await?;
        let user = self.repo
            .create_user(&mut *tx, "Administrator", email, &hashed_password, Some(role.id), true)
            .await?;
        self.activity_repo
            .record(&mut *tx, None, "bootstrap", "user", Some(user.id.to_string()), json!({ "email": email }))
            .await?;
        tx.commit().await?;

        tracing::info!(user_id = user.id, "👤 Administrador inicial criado");
        Ok(true)
    }

    async fn ensure_role_exists(&self, role_id: i32) -> Result<(), AppError> {
        match self.role_repo.find_by_id(role_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::BadRequest(format!("O cargo {} não existe.", role_id))),
        }
    }
}
