use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::visa_purchases;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = visa_purchases)]
pub struct PurchaseEntity {
    pub id: i64,
    pub user_id: i64,
    pub visa_id: i64,
    pub visa_option_id: Option<i64>,
    pub total_price: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = visa_purchases)]
pub struct InsertPurchaseEntity {
    pub user_id: i64,
    pub visa_id: i64,
    pub visa_option_id: Option<i64>,
    pub total_price: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
