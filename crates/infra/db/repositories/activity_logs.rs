use anyhow::Result;
use async_trait::async_trait;
use diesel::{dsl::count_star, pg::Pg, prelude::*};
use std::sync::Arc;

use crate::{
    domain::{
        entities::activity_logs::{ActivityLogEntity, InsertActivityLogEntity},
        repositories::activity_logs::ActivityLogRepository,
        value_objects::{activities::ActivityLogFilter, pagination::Pagination},
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::activity_logs},
};

pub struct ActivityLogPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ActivityLogPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn filtered(filter: &ActivityLogFilter) -> activity_logs::BoxedQuery<'_, Pg> {
    let mut query = activity_logs::table.into_boxed::<Pg>();

    if let Some(user_id) = filter.user_id {
        query = query.filter(activity_logs::user_id.eq(user_id));
    }
    if let Some(action) = filter.action.as_deref() {
        query = query.filter(activity_logs::action.eq(action));
    }
    if let Some(entity_type) = filter.entity_type.as_deref() {
        query = query.filter(activity_logs::entity_type.eq(entity_type));
    }
    if let Some(entity_id) = filter.entity_id {
        query = query.filter(activity_logs::entity_id.eq(entity_id));
    }

    query
}

#[async_trait]
impl ActivityLogRepository for ActivityLogPostgres {
    async fn insert(&self, entry: InsertActivityLogEntity) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let id = diesel::insert_into(activity_logs::table)
            .values(&entry)
            .returning(activity_logs::id)
            .get_result::<i64>(&mut conn)?;

        Ok(id)
    }

    async fn list(
        &self,
        filter: ActivityLogFilter,
        pagination: Pagination,
    ) -> Result<(Vec<ActivityLogEntity>, i64)> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = filtered(&filter)
            .select(count_star())
            .get_result::<i64>(&mut conn)?;

        let entries = filtered(&filter)
            .order((activity_logs::created_at.desc(), activity_logs::id.desc()))
            .offset(pagination.offset())
            .limit(pagination.per_page)
            .select(ActivityLogEntity::as_select())
            .load::<ActivityLogEntity>(&mut conn)?;

        Ok((entries, total))
    }
}
