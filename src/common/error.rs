// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Conta desativada")]
    InactiveAccount,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("{0} não encontrado")]
    NotFound(String),

    #[error("Conflito: {0}")]
    Conflict(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Converte violação de unicidade do Postgres em `Conflict`; o resto vira `DatabaseError`.
    pub fn from_unique_violation(e: sqlx::Error, message: &str) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                return AppError::Conflict(message.to_string());
            }
        }
        AppError::DatabaseError(e)
    }

    /// Mesma ideia para FK com `ON DELETE RESTRICT`: o registro ainda está em uso.
    pub fn from_foreign_key_violation(e: sqlx::Error, message: &str) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_foreign_key_violation() {
                return AppError::Conflict(message.to_string());
            }
        }
        AppError::DatabaseError(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string()),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::InactiveAccount => (StatusCode::FORBIDDEN, "Esta conta está desativada.".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} não encontrado(a).", what)),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),

            // Todos os outros erros (banco, bcrypt, jwt, anyhow) viram 500.
            // O detalhe vai só para o log, nunca para o cliente.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::Validate;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AppError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AppError::InactiveAccount, StatusCode::FORBIDDEN),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (AppError::NotFound("Cargo".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::DatabaseError(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR),
            (
                AppError::InternalServerError(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let response = AppError::InternalServerError(anyhow::anyhow!("senha do banco: 1234")).into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"], "Ocorreu um erro inesperado.");
    }

    #[tokio::test]
    async fn test_validation_error_lists_fields() {
        #[derive(Validate)]
        struct Payload {
            #[validate(email(message = "E-mail inválido."))]
            email: String,
        }

        let errors = Payload { email: "x".into() }.validate().unwrap_err();
        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["details"]["email"][0], "E-mail inválido.");
    }

    #[test]
    fn test_non_database_error_is_not_conflict() {
        let error = AppError::from_unique_violation(sqlx::Error::RowNotFound, "duplicado");
        assert!(matches!(error, AppError::DatabaseError(_)));

        let error = AppError::from_foreign_key_violation(sqlx::Error::RowNotFound, "em uso");
        assert!(matches!(error, AppError::DatabaseError(_)));
    }
}
