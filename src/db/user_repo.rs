// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use crate::{common::error::AppError, models::auth::User};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, user_type_id, is_active, created_at, updated_at";

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    // Busca um usuário pelo seu e-mail (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // Quantos usuários ainda usam este cargo (bloqueia a exclusão do cargo)
    pub async fn count_by_role<'e, E>(&self, executor: E, user_type_id: i32) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE user_type_id = $1")
            .bind(user_type_id)
            .fetch_one(executor)
            .await?;
        Ok(count)
    }

    // Cria um novo usuário no banco de dados
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: &str,
        hashed_password: &str,
        user_type_id: Option<i32>,
        is_active: bool,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, user_type_id, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(email)
        .bind(hashed_password)
        .bind(user_type_id)
        .bind(is_active)
        .fetch_one(executor)
        .await
        // Converte erro de violação de chave única em um erro mais amigável
        .map_err(|e| AppError::from_unique_violation(e, "Este e-mail já está em uso."))
    }

    /// Atualiza só os campos informados (`None` mantém o valor atual).
    #[allow(clippy::too_many_arguments)]
    pub async fn update_user<'e, E>(
        &self,
        executor: E,
        id: i32,
        name: Option<&str>,
        email: Option<&str>,
        hashed_password: Option<&str>,
        user_type_id: Option<i32>,
        clear_user_type: bool,
        is_active: Option<bool>,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                user_type_id = CASE WHEN $6 THEN NULL ELSE COALESCE($5, user_type_id) END,
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(hashed_password)
        .bind(user_type_id)
        .bind(clear_user_type)
        .bind(is_active)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Este e-mail já está em uso."))
    }

    /// Retorna `false` se o usuário não existia.
    pub async fn delete_user<'e, E>(&self, executor: E, id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
