use anyhow::Result;
use async_trait::async_trait;
use diesel::{dsl::count_star, pg::Pg, prelude::*};
use std::sync::Arc;

use crate::{
    domain::{
        entities::visas::{VisaEntity, VisaOptionEntity},
        repositories::visas::VisaRepository,
        value_objects::{pagination::Pagination, visas::VisaFilter},
    },
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{visa_options, visas},
    },
};

pub struct VisaPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl VisaPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn active_visas(filter: &VisaFilter) -> visas::BoxedQuery<'static, Pg> {
    let mut query = visas::table
        .filter(visas::is_active.eq(true))
        .filter(visas::deleted_at.is_null())
        .into_boxed();

    if let Some(country) = &filter.country {
        query = query.filter(visas::country.ilike(format!("%{}%", country)));
    }
    if let Some(visa_type) = &filter.visa_type {
        query = query.filter(visas::visa_type.ilike(format!("%{}%", visa_type)));
    }

    query
}

#[async_trait]
impl VisaRepository for VisaPostgres {
    async fn find_by_id(&self, visa_id: i64) -> Result<Option<VisaEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let visa = visas::table
            .filter(visas::id.eq(visa_id))
            .filter(visas::deleted_at.is_null())
            .select(VisaEntity::as_select())
            .first::<VisaEntity>(&mut conn)
            .optional()?;

        Ok(visa)
    }

    async fn find_active_by_id(&self, visa_id: i64) -> Result<Option<VisaEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let visa = visas::table
            .filter(visas::id.eq(visa_id))
            .filter(visas::is_active.eq(true))
            .filter(visas::deleted_at.is_null())
            .select(VisaEntity::as_select())
            .first::<VisaEntity>(&mut conn)
            .optional()?;

        Ok(visa)
    }

    async fn find_option_by_id(&self, option_id: i64) -> Result<Option<VisaOptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let option = visa_options::table
            .filter(visa_options::id.eq(option_id))
            .filter(visa_options::deleted_at.is_null())
            .select(VisaOptionEntity::as_select())
            .first::<VisaOptionEntity>(&mut conn)
            .optional()?;

        Ok(option)
    }

    async fn find_active_option(
        &self,
        option_id: i64,
        visa_id: i64,
    ) -> Result<Option<VisaOptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let option = visa_options::table
            .filter(visa_options::id.eq(option_id))
            .filter(visa_options::visa_id.eq(visa_id))
            .filter(visa_options::is_active.eq(true))
            .filter(visa_options::deleted_at.is_null())
            .select(VisaOptionEntity::as_select())
            .first::<VisaOptionEntity>(&mut conn)
            .optional()?;

        Ok(option)
    }

    async fn list_active(
        &self,
        filter: VisaFilter,
        pagination: Pagination,
    ) -> Result<(Vec<VisaEntity>, i64)> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = active_visas(&filter)
            .select(count_star())
            .get_result::<i64>(&mut conn)?;

        let visas = active_visas(&filter)
            .order((visas::created_at.desc(), visas::id.desc()))
            .offset(pagination.offset())
            .limit(pagination.per_page)
            .select(VisaEntity::as_select())
            .load::<VisaEntity>(&mut conn)?;

        Ok((visas, total))
    }

    async fn list_active_options(&self, visa_id: i64) -> Result<Vec<VisaOptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let options = visa_options::table
            .filter(visa_options::visa_id.eq(visa_id))
            .filter(visa_options::is_active.eq(true))
            .filter(visa_options::deleted_at.is_null())
            .order((visa_options::price.asc(), visa_options::id.asc()))
            .select(VisaOptionEntity::as_select())
            .load::<VisaOptionEntity>(&mut conn)?;

        Ok(options)
    }
}
