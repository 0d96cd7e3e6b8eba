// src/services/settings_service.rs

use serde_json::json;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{ActivityLogRepository, SettingsRepository},
    models::settings::{Setting, UpdateSettingRequest},
};

#[derive(Clone)]
pub struct SettingsService {
    repo: SettingsRepository,
    activity_repo: ActivityLogRepository,
    pool: PgPool,
}

impl SettingsService {
    pub fn new(repo: SettingsRepository, activity_repo: ActivityLogRepository, pool: PgPool) -> Self {
        Self { repo, activity_repo, pool }
    }

    pub async fn list_settings(&self) -> Result<Vec<Setting>, AppError> {
        self.repo.list().await
    }

    pub async fn get_setting(&self, key: &str) -> Result<Setting, AppError> {
        self.repo
            .get(key)
            .await?
            .ok_or(AppError::NotFound("Configuração".into()))
    }

    // Valor gravado e log na mesma transação
    pub async fn update_setting(
        &self,
        actor_id: i32,
        key: &str,
        input: &UpdateSettingRequest,
    ) -> Result<Setting, AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = self.repo.upsert(&mut *tx, key, input).await?;

        self.activity_repo
            .record(&mut *tx, Some(actor_id), "update", "setting", Some(updated.key.clone()), json!({ "value": updated.value }))
            .await?;

        tx.commit().await?;
        Ok(updated)
    }
}
