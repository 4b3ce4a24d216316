use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;

use crate::domain::entities::users::{UserCredentials, UserEntity};

#[automock]
#[async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, user_id: i64) -> Result<Option<UserEntity>>;

    /// Inactive and soft-deleted accounts are never returned.
    async fn find_active_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>>;

    async fn record_login(&self, user_id: i64, logged_in_at: DateTime<Utc>) -> Result<()>;
}
