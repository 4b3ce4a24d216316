use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::{visa_options, visas};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = visas)]
pub struct VisaEntity {
    pub id: i64,
    pub country: String,
    pub visa_type: String,
    pub price: i64,
    pub duration_days: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl VisaEntity {
    /// Display label used on invoices and gateway line items, e.g. "Japan Visa - Tourist".
    pub fn label(&self) -> String {
        format!("{} Visa - {}", self.country, self.visa_type)
    }
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = visa_options)]
pub struct VisaOptionEntity {
    pub id: i64,
    pub visa_id: i64,
    pub name: String,
    pub price: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}
