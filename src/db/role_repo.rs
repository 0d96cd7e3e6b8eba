// src/db/role_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use crate::common::error::AppError;
use crate::models::rbac::{PermissionEntry, Role, RolePermission};

const ROLE_COLUMNS: &str = "id, name, description, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>(&format!("SELECT {ROLE_COLUMNS} FROM user_types ORDER BY name"))
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(&format!("SELECT {ROLE_COLUMNS} FROM user_types WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(&format!("SELECT {ROLE_COLUMNS} FROM user_types WHERE name = $1"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    // 1. Criar o Cargo
    pub async fn create_role<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        is_active: bool,
    ) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Role>(&format!(
            r#"
            INSERT INTO user_types (name, description, is_active)
            VALUES ($1, $2, $3)
            RETURNING {ROLE_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(description)
        .bind(is_active)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe um cargo com esse nome."))
    }

    pub async fn update_role<'e, E>(
        &self,
        executor: E,
        id: i32,
        name: Option<&str>,
        description: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<Option<Role>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Role>(&format!(
            r#"
            UPDATE user_types SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ROLE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(is_active)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe um cargo com esse nome."))
    }

    pub async fn delete_role<'e, E>(&self, executor: E, id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // ON DELETE RESTRICT: usuário atribuído no meio do caminho vira 409
        let result = sqlx::query("DELETE FROM user_types WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| AppError::from_foreign_key_violation(e, "O cargo ainda está atribuído a usuários."))?;
        Ok(result.rows_affected() > 0)
    }

    // 2. Matriz de permissões do cargo
    pub async fn list_permissions<'e, E>(
        &self,
        executor: E,
        user_type_id: i32,
    ) -> Result<Vec<RolePermission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let permissions = sqlx::query_as::<_, RolePermission>(
            r#"
            SELECT user_type_id, admin_module_id, can_view, can_create, can_edit, can_delete
            FROM user_type_permissions
            WHERE user_type_id = $1
            ORDER BY admin_module_id
            "#,
        )
        .bind(user_type_id)
        .fetch_all(executor)
        .await?;

        Ok(permissions)
    }

    pub async fn clear_permissions<'e, E>(&self, executor: E, user_type_id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM user_type_permissions WHERE user_type_id = $1")
            .bind(user_type_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // 3. Vincular Cargo <-> Módulo (inserção em massa usando UNNEST)
    pub async fn insert_permissions<'e, E>(
        &self,
        executor: E,
        user_type_id: i32,
        entries: &[PermissionEntry],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let columns = PermissionColumns::from_entries(entries);

        sqlx::query(
            r#"
            INSERT INTO user_type_permissions
                (user_type_id, admin_module_id, can_view, can_create, can_edit, can_delete)
            SELECT $1, m, v, c, e, d
            FROM UNNEST($2::int4[], $3::bool[], $4::bool[], $5::bool[], $6::bool[]) AS t(m, v, c, e, d)
            "#,
        )
        .bind(user_type_id)
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
}

/// A matriz "transposta" em colunas, no formato que o UNNEST espera.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct PermissionColumns {
    pub module_ids: Vec<i32>,
    pub view: Vec<bool>,
    pub create: Vec<bool>,
    pub edit: Vec<bool>,
    pub delete: Vec<bool>,
}

impl PermissionColumns {
    pub(crate) fn from_entries(entries: &[PermissionEntry]) -> Self {
        let mut columns = Self::default();
        for entry in entries {
            columns.module_ids.push(entry.admin_module_id);
            columns.view.push(entry.permissions.view);
            columns.create.push(entry.permissions.create);
            columns.edit.push(entry.permissions.edit);
            columns.delete.push(entry.permissions.delete);
        }
        columns
    }
}
