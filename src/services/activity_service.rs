// src/services/activity_service.rs

use crate::{
    common::error::AppError,
    db::ActivityLogRepository,
    models::activity::{ActivityLogPage, ActivityLogQuery},
};

#[derive(Clone)]
pub struct ActivityService {
    repo: ActivityLogRepository,
}

impl ActivityService {
    pub fn new(repo: ActivityLogRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self, query: &ActivityLogQuery) -> Result<ActivityLogPage, AppError> {
        let (per_page, offset) = query.limit_offset();
        let (items, total) = self.repo.list(query).await?;

        Ok(ActivityLogPage {
            items,
            page: offset / per_page + 1,
            per_page,
            total,
        })
    }
}
