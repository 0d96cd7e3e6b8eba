// src/db/activity_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use crate::{
    common::error::AppError,
    models::activity::{ActivityLog, ActivityLogQuery},
};

#[derive(Clone)]
pub struct ActivityLogRepository {
    pool: PgPool,
}

impl ActivityLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grava uma entrada. Aceita a transação do serviço para que o log
    /// só exista se a alteração também existir.
    pub async fn record<'e, E>(
        &self,
        executor: E,
        user_id: Option<i32>,
        action: &str,
        entity: &str,
        entity_id: Option<String>,
        details: serde_json::Value,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (id, user_id, action, entity, entity_id, details)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(uuid::Uuid::new_v4())
        .bind(user_id)
        .bind(action)
        .bind(entity)
        .bind(entity_id)
        .bind(details)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Grava fora de qualquer transação (ex: login).
    pub async fn record_now(
        &self,
        user_id: Option<i32>,
        action: &str,
        entity: &str,
        entity_id: Option<String>,
        details: serde_json::Value,
    ) -> Result<(), AppError> {
        self.record(&self.pool, user_id, action, entity, entity_id, details).await
    }

    // Mais recentes primeiro, com o total para a paginação do frontend
    pub async fn list(&self, query: &ActivityLogQuery) -> Result<(Vec<ActivityLog>, i64), AppError> {
        let (limit, offset) = query.limit_offset();

        let items = sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT id, user_id, action, entity, entity_id, details, created_at
            FROM activity_logs
            WHERE ($1::int4 IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR entity = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(query.user_id)
        .bind(query.entity.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM activity_logs
            WHERE ($1::int4 IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR entity = $2)
            "#,
        )
        .bind(query.user_id)
        .bind(query.entity.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok((items, total))
    }
}
