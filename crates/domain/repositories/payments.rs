use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::entities::payments::{InsertPaymentEntity, PaymentEntity};

#[automock]
#[async_trait]
pub trait PaymentRepository {
    async fn create(&self, payment: InsertPaymentEntity) -> Result<PaymentEntity>;

    async fn find_by_id(&self, payment_id: i64) -> Result<Option<PaymentEntity>>;

    async fn find_by_id_for_user(
        &self,
        payment_id: i64,
        user_id: i64,
    ) -> Result<Option<PaymentEntity>>;

    async fn find_by_gateway_id(&self, gateway_id: &str) -> Result<Option<PaymentEntity>>;

    /// Most recent payment attempt for a purchase.
    async fn find_latest_by_purchase(&self, purchase_id: i64) -> Result<Option<PaymentEntity>>;

    /// Most recent attempt for a purchase that settled as paid.
    async fn find_latest_paid_by_purchase(
        &self,
        purchase_id: i64,
    ) -> Result<Option<PaymentEntity>>;

    /// Sets `new_status` only while the row still holds `expected_status`.
    /// Returns whether a row was changed.
    async fn update_status_if(
        &self,
        payment_id: i64,
        expected_status: &str,
        new_status: &str,
    ) -> Result<bool>;
}
