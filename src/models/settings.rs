// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Setting {
    #[schema(example = "site_name")]
    pub key: String,

    #[schema(example = "Painel Administrativo")]
    pub value: String,

    #[schema(example = "Nome exibido no topo do painel")]
    pub description: Option<String>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSettingRequest {
    #[validate(length(max = 5000, message = "O valor deve ter no máximo 5000 caracteres."))]
    #[schema(example = "Meu Painel")]
    pub value: String,

    pub description: Option<String>,
}
