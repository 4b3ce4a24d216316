use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::payments::PaymentEntity, value_objects::enums::payment_methods::PaymentMethod,
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentModel {
    pub purchase_id: i64,
    pub payment_method: PaymentMethod,
    pub bank_code: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentDto {
    pub id: i64,
    pub user_id: i64,
    pub purchase_id: i64,
    pub payment_method: String,
    pub amount: i64,
    pub status: String,
    pub gateway_id: String,
    pub external_id: String,
    pub payment_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentEntity> for PaymentDto {
    fn from(value: PaymentEntity) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            purchase_id: value.purchase_id,
            payment_method: value.payment_method,
            amount: value.amount,
            status: value.status,
            gateway_id: value.gateway_id,
            external_id: value.external_id,
            payment_url: value.payment_url,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Invoice callback posted by the gateway. Only `id` and `status` drive reconciliation.
#[derive(Debug, Clone, Deserialize)]
pub struct XenditWebhookPayload {
    pub id: String,
    #[serde(default)]
    pub external_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookResultDto {
    pub payment_id: i64,
    pub status: String,
}
