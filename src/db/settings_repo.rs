// src/db/settings_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use crate::{
    common::error::AppError,
    models::settings::{Setting, UpdateSettingRequest},
};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Setting>, AppError> {
        let settings = sqlx::query_as::<_, Setting>(
            "SELECT key, value, description, updated_at FROM settings ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(settings)
    }

    pub async fn get(&self, key: &str) -> Result<Option<Setting>, AppError> {
        let setting = sqlx::query_as::<_, Setting>(
            "SELECT key, value, description, updated_at FROM settings WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(setting)
    }

    // UPSERT (Insert or Update). Sem descrição nova, mantém a antiga.
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        key: &str,
        input: &UpdateSettingRequest,
    ) -> Result<Setting, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let setting = sqlx::query_as::<_, Setting>(
            r#"
            INSERT INTO settings (key, value, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (key)
            DO UPDATE SET
                value = EXCLUDED.value,
                description = COALESCE(EXCLUDED.description, settings.description),
                updated_at = NOW()
            RETURNING key, value, description, updated_at
            "#,
        )
        .bind(key)
        .bind(&input.value)
        .bind(input.description.as_deref())
        .fetch_one(executor)
        .await?;

        tracing::debug!(key = %setting.key, "Configuração gravada");
        Ok(setting)
    }
}
