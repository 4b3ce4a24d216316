use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::payments;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payments)]
pub struct PaymentEntity {
    pub id: i64,
    pub user_id: i64,
    pub purchase_id: i64,
    pub payment_method: String,
    pub amount: i64,
    pub status: String,
    /// Invoice id issued by the gateway. Unique, and the only key webhooks carry.
    pub gateway_id: String,
    pub external_id: String,
    pub payment_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
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
