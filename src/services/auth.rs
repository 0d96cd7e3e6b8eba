// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde_json::json;

use crate::{
    common::error::AppError,
    db::{ActivityLogRepository, UserRepository},
    models::auth::{AuthResponse, Claims, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    activity_repo: ActivityLogRepository,
    jwt_secret: String,
    jwt_ttl_hours: i64,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        activity_repo: ActivityLogRepository,
        jwt_secret: String,
        jwt_ttl_hours: i64,
    ) -> Self {
        Self { user_repo, activity_repo, jwt_secret, jwt_ttl_hours }
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self.user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        // Só depois de validar a senha, para não revelar quais contas existem
        if !user.is_active {
            return Err(AppError::InactiveAccount);
        }

        self.activity_repo
            .record_now(Some(user.id), "login", "user", Some(user.id.to_string()), json!({}))
            .await?;

        tracing::info!(user_id = user.id, "🔑 Login realizado");

        let token = encode_token(&self.jwt_secret, user.id, self.jwt_ttl_hours)?;
        Ok(AuthResponse { token, user })
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let user_id = decode_token(&self.jwt_secret, token)?;

        let user = self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !user.is_active {
            return Err(AppError::InactiveAccount);
        }

        Ok(user)
    }
}

pub(crate) fn encode_token(secret: &str, user_id: i32, ttl_hours: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::hours(ttl_hours);

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

/// Retorna o ID do usuário dono do token.
pub(crate) fn decode_token(secret: &str, token: &str) -> Result<i32, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;

    token_data.claims.sub.parse().map_err(|_| AppError::InvalidToken)
}

// O bcrypt é caro: roda em um thread separado para não travar o runtime
pub(crate) async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub(crate) async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();

    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "segredo-de-teste";

    #[test]
    fn test_token_round_trip() {
        let token = encode_token(SECRET, 42, 1).unwrap();
        assert_eq!(decode_token(SECRET, &token).unwrap(), 42);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = encode_token(SECRET, 42, 1).unwrap();
        assert!(matches!(decode_token("outro", &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = encode_token(SECRET, 42, -2).unwrap();
        assert!(matches!(decode_token(SECRET, &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(matches!(decode_token(SECRET, "nao.e.jwt"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let hashed = hash_password("segredo123").await.unwrap();
        assert_ne!(hashed, "segredo123");
        assert!(verify_password("segredo123", &hashed).await.unwrap());
        assert!(!verify_password("errada", &hashed).await.unwrap());
    }
}
