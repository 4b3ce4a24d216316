use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::visas::{VisaEntity, VisaOptionEntity},
    value_objects::{pagination::Pagination, visas::VisaFilter},
};

#[automock]
#[async_trait]
pub trait VisaRepository {
    /// Looks up a visa regardless of its active flag; soft-deleted rows are still excluded.
    async fn find_by_id(&self, visa_id: i64) -> Result<Option<VisaEntity>>;

    async fn find_active_by_id(&self, visa_id: i64) -> Result<Option<VisaEntity>>;

    async fn find_option_by_id(&self, option_id: i64) -> Result<Option<VisaOptionEntity>>;

    async fn find_active_option(
        &self,
        option_id: i64,
        visa_id: i64,
    ) -> Result<Option<VisaOptionEntity>>;

    /// Active visas matching `filter`, newest first, with the unpaginated total.
    async fn list_active(
        &self,
        filter: VisaFilter,
        pagination: Pagination,
    ) -> Result<(Vec<VisaEntity>, i64)>;

    /// Active options of a visa, cheapest first.
    async fn list_active_options(&self, visa_id: i64) -> Result<Vec<VisaOptionEntity>>;
}
