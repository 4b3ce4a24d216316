use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{dsl::count_star, prelude::*};
use std::sync::Arc;

use crate::{
    domain::{
        entities::purchases::{InsertPurchaseEntity, PurchaseEntity},
        repositories::purchases::PurchaseRepository,
        value_objects::pagination::Pagination,
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::visa_purchases},
};

pub struct PurchasePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PurchasePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PurchaseRepository for PurchasePostgres {
    async fn create(&self, purchase: InsertPurchaseEntity) -> Result<PurchaseEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let created = diesel::insert_into(visa_purchases::table)
            .values(&purchase)
            .returning(PurchaseEntity::as_returning())
            .get_result::<PurchaseEntity>(&mut conn)?;

        Ok(created)
    }

    async fn find_by_id(&self, purchase_id: i64) -> Result<Option<PurchaseEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let purchase = visa_purchases::table
            .filter(visa_purchases::id.eq(purchase_id))
            .filter(visa_purchases::deleted_at.is_null())
            .select(PurchaseEntity::as_select())
            .first::<PurchaseEntity>(&mut conn)
            .optional()?;

        Ok(purchase)
    }

    async fn find_by_id_for_user(
        &self,
        purchase_id: i64,
        user_id: i64,
    ) -> Result<Option<PurchaseEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let purchase = visa_purchases::table
            .filter(visa_purchases::id.eq(purchase_id))
            .filter(visa_purchases::user_id.eq(user_id))
            .filter(visa_purchases::deleted_at.is_null())
            .select(PurchaseEntity::as_select())
            .first::<PurchaseEntity>(&mut conn)
            .optional()?;

        Ok(purchase)
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        pagination: Pagination,
    ) -> Result<(Vec<PurchaseEntity>, i64)> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = visa_purchases::table
            .filter(visa_purchases::user_id.eq(user_id))
            .filter(visa_purchases::deleted_at.is_null())
            .select(count_star())
            .get_result::<i64>(&mut conn)?;

        let purchases = visa_purchases::table
            .filter(visa_purchases::user_id.eq(user_id))
            .filter(visa_purchases::deleted_at.is_null())
            .order(visa_purchases::created_at.desc())
            .offset(pagination.offset())
            .limit(pagination.per_page)
            .select(PurchaseEntity::as_select())
            .load::<PurchaseEntity>(&mut conn)?;

        Ok((purchases, total))
    }

    async fn update_status_if(
        &self,
        purchase_id: i64,
        expected_status: &str,
        new_status: &str,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = diesel::update(visa_purchases::table)
            .filter(visa_purchases::id.eq(purchase_id))
            .filter(visa_purchases::status.eq(expected_status))
            .filter(visa_purchases::deleted_at.is_null())
            .set((
                visa_purchases::status.eq(new_status),
                visa_purchases::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(affected == 1)
    }
}
