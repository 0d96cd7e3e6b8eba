// src/services/module_service.rs

use serde_json::json;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{ActivityLogRepository, ModuleRepository},
    models::rbac::{AdminModule, CreateModulePayload, UpdateModulePayload},
};

#[derive(Clone)]
pub struct ModuleService {
    repo: ModuleRepository,
    activity_repo: ActivityLogRepository,
    pool: PgPool,
}

impl ModuleService {
    pub fn new(repo: ModuleRepository, activity_repo: ActivityLogRepository, pool: PgPool) -> Self {
        Self { repo, activity_repo, pool }
    }

    pub async fn list_modules(&self, active_only: bool) -> Result<Vec<AdminModule>, AppError> {
        self.repo.list(active_only).await
    }

    pub async fn create_module(&self, actor_id: i32, payload: CreateModulePayload) -> Result<AdminModule, AppError> {
        let mut tx = self.pool.begin().await?;

        let module = self.repo
            .create_module(
                &mut *tx,
                payload.name.trim(),
                payload.category.as_deref(),
                payload.is_active.unwrap_or(true),
            )
            .await?;

        self.activity_repo
            .record(&mut *tx, Some(actor_id), "create", "module", Some(module.id.to_string()), json!({ "name": module.name }))
            .await?;

        tx.commit().await?;
        Ok(module)
    }

    pub async fn update_module(&self, actor_id: i32, id: i32, payload: UpdateModulePayload) -> Result<AdminModule, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self.repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Módulo".into()))?;
        ensure_update_allowed(&current, &payload)?;

        let module = self.repo
            .update_module(
                &mut *tx,
                id,
                payload.name.as_deref().map(str::trim),
                payload.category.as_deref(),
                payload.is_active,
            )
            .await?
            .ok_or(AppError::NotFound("Módulo".into()))?;

        self.activity_repo
            .record(&mut *tx, Some(actor_id), "update", "module", Some(id.to_string()), json!({ "name": module.name }))
            .await?;

        tx.commit().await?;
        Ok(module)
    }

    pub async fn delete_module(&self, actor_id: i32, id: i32) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self.repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("Módulo".into()))?;
        if current.is_built_in() {
            return Err(AppError::Conflict(format!(
                "O módulo '{}' é do sistema e não pode ser excluído.",
                current.name
            )));
        }

        if !self.repo.delete_module(&mut *tx, id).await? {
            return Err(AppError::NotFound("Módulo".into()));
        }

        self.activity_repo
            .record(&mut *tx, Some(actor_id), "delete", "module", Some(id.to_string()), json!({}))
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

// Módulos do sistema: só a categoria pode mudar
fn ensure_update_allowed(current: &AdminModule, payload: &UpdateModulePayload) -> Result<(), AppError> {
    if !current.is_built_in() {
        return Ok(());
    }

    let renamed = payload.name.as_deref().is_some_and(|name| name.trim() != current.name);
    if renamed || payload.is_active == Some(false) {
        return Err(AppError::Conflict(format!(
            "O módulo '{}' é do sistema e não pode ser renomeado nem desativado.",
            current.name
        )));
    }
    Ok(())
}
