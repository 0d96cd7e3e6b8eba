// src/models/activity.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

// Uma linha do log de atividades
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ActivityLog {
    pub id: Uuid,

    // Nulo quando a ação não tem autor (ex: bootstrap do sistema)
    pub user_id: Option<i32>,

    #[schema(example = "update")]
    pub action: String,

    #[schema(example = "role")]
    pub entity: String,

    #[schema(example = "3")]
    pub entity_id: Option<String>,

    #[schema(value_type = Object)]
    pub details: serde_json::Value,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityLogQuery {
    pub user_id: Option<i32>,
    pub entity: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ActivityLogQuery {
    /// (limit, offset) já normalizados.
    pub fn limit_offset(&self) -> (i64, i64) {
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        let page = self.page.unwrap_or(1).max(1);
        // Páginas absurdas viram um OFFSET enorme (lista vazia), nunca overflow
        (per_page, (page - 1).saturating_mul(per_page))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityLogPage {
    pub items: Vec<ActivityLog>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query = ActivityLogQuery::default();
        assert_eq!(query.limit_offset(), (DEFAULT_PER_PAGE, 0));
    }

    #[test]
    fn test_clamps_page_and_size() {
        let query = ActivityLogQuery { page: Some(0), per_page: Some(1_000), ..Default::default() };
        assert_eq!(query.limit_offset(), (MAX_PER_PAGE, 0));

        let query = ActivityLogQuery { page: Some(3), per_page: Some(10), ..Default::default() };
        assert_eq!(query.limit_offset(), (10, 20));
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let query = ActivityLogQuery { page: Some(i64::MAX), per_page: Some(MAX_PER_PAGE), ..Default::default() };
        let (limit, offset) = query.limit_offset();
        assert_eq!(limit, MAX_PER_PAGE);
        assert_eq!(offset, i64::MAX);

        let query = ActivityLogQuery { page: Some(i64::MIN), ..Default::default() };
        assert_eq!(query.limit_offset(), (DEFAULT_PER_PAGE, 0));
    }
}
