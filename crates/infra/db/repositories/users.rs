use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::sync::Arc;

use crate::{
    domain::{
        entities::users::{UserCredentials, UserEntity},
        repositories::users::UserRepository,
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::users},
};

pub struct UserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserRepository for UserPostgres {
    async fn find_by_id(&self, user_id: i64) -> Result<Option<UserEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let user = users::table
            .filter(users::id.eq(user_id))
            .filter(users::deleted_at.is_null())
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(user)
    }

    async fn find_active_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = users::table
            .filter(users::email.eq(email))
            .filter(users::is_active.eq(true))
            .filter(users::deleted_at.is_null())
            .select((UserEntity::as_select(), users::password_hash))
            .first::<(UserEntity, Option<String>)>(&mut conn)
            .optional()?;

        Ok(row.map(|(user, password_hash)| UserCredentials {
            user,
            password_hash,
        }))
    }

    async fn record_login(&self, user_id: i64, logged_in_at: DateTime<Utc>) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        diesel::update(users::table)
            .filter(users::id.eq(user_id))
            .set(users::last_login_at.eq(Some(logged_in_at)))
            .execute(&mut conn)?;

        Ok(())
    }
}
