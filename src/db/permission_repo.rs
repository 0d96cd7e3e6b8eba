// src/db/permission_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use crate::common::error::AppError;
use crate::db::role_repo::PermissionColumns;
use crate::models::rbac::{PermissionEntry, UserPermission};

// Overrides individuais (tabela user_permissions)
#[derive(Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<UserPermission>, AppError> {
        let permissions = sqlx::query_as::<_, UserPermission>(
            r#"
            SELECT user_id, admin_module_id, can_view, can_create, can_edit, can_delete
            FROM user_permissions
            WHERE user_id = $1
            ORDER BY admin_module_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(permissions)
    }

    pub async fn clear_for_user<'e, E>(&self, executor: E, user_id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM user_permissions WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn insert_for_user<'e, E>(
        &self,
        executor: E,
        user_id: i32,
        entries: &[PermissionEntry],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let columns = PermissionColumns::from_entries(entries);

        sqlx::query(
            r#"
            INSERT INTO user_permissions
                (user_id, admin_module_id, can_view, can_create, can_edit, can_delete)
            SELECT $1, m, v, c, e, d
            FROM UNNEST($2::int4[], $3::bool[], $4::bool[], $5::bool[], $6::bool[]) AS t(m, v, c, e, d)
            "#,
        )
        .bind(user_id)
        .bind(columns.module_ids)
        .bind(columns.view)
        .bind(columns.create)
        .bind(columns.edit)
        .bind(columns.delete)
        .execute(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Módulo repetido na matriz de permissões."))?;

        Ok(())
    }

    pub async fn delete_one<'e, E>(&self, executor: E, user_id: i32, admin_module_id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM user_permissions WHERE user_id = $1 AND admin_module_id = $2")
            .bind(user_id)
            .bind(admin_module_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
