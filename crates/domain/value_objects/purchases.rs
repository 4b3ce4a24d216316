use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::purchases::PurchaseEntity;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePurchaseModel {
    pub visa_id: i64,
    pub visa_option_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePurchaseStatusModel {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseDto {
    pub id: i64,
    pub user_id: i64,
    pub visa_id: i64,
    pub visa_option_id: Option<i64>,
    pub total_price: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PurchaseEntity> for PurchaseDto {
    fn from(value: PurchaseEntity) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            visa_id: value.visa_id,
            visa_option_id: value.visa_option_id,
            total_price: value.total_price,
            status: value.status,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}
