use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::activity_logs::{ActivityLogEntity, InsertActivityLogEntity},
    value_objects::{activities::ActivityLogFilter, pagination::Pagination},
};

#[automock]
#[async_trait]
pub trait ActivityLogRepository {
    async fn insert(&self, entry: InsertActivityLogEntity) -> Result<i64>;

    /// Newest first.
    async fn list(
        &self,
        filter: ActivityLogFilter,
        pagination: Pagination,
    ) -> Result<(Vec<ActivityLogEntity>, i64)>;
}
