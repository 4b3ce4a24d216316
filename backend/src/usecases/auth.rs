use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tracing::{error, info, warn};
use visa_core::domain::{
    repositories::users::UserRepository,
    value_objects::auth::{LoginDto, LoginModel, LoginUserDto},
};

use super::errors::{UseCaseError, UseCaseResult};
use crate::auth::{issue_jwt, passwords};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct AuthUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    jwt_secret: String,
}

impl<U> AuthUseCase<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, jwt_secret: String) -> Self {
        Self {
            user_repo,
            jwt_secret,
        }
    }

    /// Unknown accounts, inactive accounts and wrong passwords all get the same answer.
    pub async fn login(&self, model: LoginModel) -> UseCaseResult<LoginDto> {
        let email = model.email.trim();
        if email.is_empty() || model.password.is_empty() {
            return Err(UseCaseError::Validation(
                "email and password are required".to_string(),
            ));
        }

        let credentials = self
            .user_repo
            .find_active_credentials_by_email(email)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "auth: failed to load credentials");
                UseCaseError::Persistence(err)
            })?
            .ok_or_else(|| {
                info!("auth: login rejected, no active account");
                UseCaseError::Unauthorized(INVALID_CREDENTIALS.to_string())
            })?;

        let user_id = credentials.user.id;
        let Some(stored_hash) = credentials.password_hash else {
            info!(%user_id, "auth: login rejected, account has no password");
            return Err(UseCaseError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let password = model.password;
        let verified =
            tokio::task::spawn_blocking(move || passwords::verify_password(&password, &stored_hash))
                .await
                .context("password verification task failed")?;

        if !verified {
            info!(%user_id, "auth: login rejected, wrong password");
            return Err(UseCaseError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let now = Utc::now();
        if let Err(err) = self.user_repo.record_login(user_id, now).await {
            warn!(%user_id, db_error = ?err, "auth: failed to record login time");
        }

        let token = issue_jwt(&self.jwt_secret, user_id, now)?;

        info!(%user_id, "auth: login succeeded");

        Ok(LoginDto {
            token,
            user: LoginUserDto::new(credentials.user, now),
        })
    }
}
