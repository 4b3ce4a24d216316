use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::purchases::{InsertPurchaseEntity, PurchaseEntity},
    value_objects::pagination::Pagination,
};

#[automock]
#[async_trait]
pub trait PurchaseRepository {
    async fn create(&self, purchase: InsertPurchaseEntity) -> Result<PurchaseEntity>;

    async fn find_by_id(&self, purchase_id: i64) -> Result<Option<PurchaseEntity>>;

    async fn find_by_id_for_user(
        &self,
        purchase_id: i64,
        user_id: i64,
    ) -> Result<Option<PurchaseEntity>>;

    async fn list_for_user(
        &self,
        user_id: i64,
        pagination: Pagination,
    ) -> Result<(Vec<PurchaseEntity>, i64)>;

    /// Sets `new_status` only while the row still holds `expected_status`.
    /// Returns whether a row was changed.
    async fn update_status_if(
        &self,
        purchase_id: i64,
        expected_status: &str,
        new_status: &str,
    ) -> Result<bool>;
}
