// src/models/users.rs

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::validation::validate_not_blank;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserPayload {
    #[validate(length(min = 1, max = 150, message = "O nome é obrigatório."))]
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "João Lima")]
    pub name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "joao@empresa.com")]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[schema(example = 2)]
    pub user_type_id: Option<i32>,

    pub is_active: Option<bool>,
}

// Todos os campos opcionais: só o que vier é alterado
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, max = 150, message = "O nome não pode ser vazio."))]
    #[validate(custom(function = "validate_not_blank"))]
    pub name: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,

    pub user_type_id: Option<i32>,

    // Remove o cargo do usuário (user_type_id = NULL)
    #[serde(default)]
    pub clear_user_type: bool,

    pub is_active: Option<bool>,
}
