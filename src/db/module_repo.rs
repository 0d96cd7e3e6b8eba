// src/db/module_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use crate::{common::error::AppError, models::rbac::AdminModule};

const MODULE_COLUMNS: &str = "id, name, category, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct ModuleRepository {
    pool: PgPool,
}

impl ModuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Lista os módulos (para o frontend montar a matriz de permissões)
    pub async fn list(&self, active_only: bool) -> Result<Vec<AdminModule>, AppError> {
        let modules = sqlx::query_as::<_, AdminModule>(&format!(
            r#"
            SELECT {MODULE_COLUMNS} FROM admin_modules
            WHERE ($1 = false OR is_active = true)
            ORDER BY category NULLS LAST, name
            "#
        ))
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(modules)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<AdminModule>, AppError> {
        let module = sqlx::query_as::<_, AdminModule>(&format!(
            "SELECT {MODULE_COLUMNS} FROM admin_modules WHERE LOWER(name) = LOWER($1)"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(module)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<AdminModule>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let module = sqlx::query_as::<_, AdminModule>(&format!(
            "SELECT {MODULE_COLUMNS} FROM admin_modules WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(module)
    }

    /// Dos IDs informados, quais existem de fato.
    pub async fn existing_ids(&self, ids: &[i32]) -> Result<Vec<i32>, AppError> {
        let found: Vec<i32> = sqlx::query_scalar("SELECT id FROM admin_modules WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(found)
    }

    pub async fn create_module<'e, E>(
        &self,
        executor: E,
        name: &str,
        category: Option<&str>,
        is_active: bool,
    ) -> Result<AdminModule, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, AdminModule>(&format!(
            r#"
            INSERT INTO admin_modules (name, category, is_active)
            VALUES ($1, $2, $3)
            RETURNING {MODULE_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(category)
        .bind(is_active)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe um módulo com esse nome."))
    }

    pub async fn update_module<'e, E>(
        &self,
        executor: E,
        id: i32,
        name: Option<&str>,
        category: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<Option<AdminModule>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, AdminModule>(&format!(
            r#"
            UPDATE admin_modules SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {MODULE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(category)
        .bind(is_active)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe um módulo com esse nome."))
    }

    // As permissões (de cargo e de usuário) caem junto via ON DELETE CASCADE
    pub async fn delete_module<'e, E>(&self, executor: E, id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM admin_modules WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
