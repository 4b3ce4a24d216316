use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{axum_http::error_responses::AppError, config::config_loader};

pub mod passwords;

pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub exp: usize,
    #[serde(default)]
    pub iat: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

#[derive(Debug)]
pub struct AuthError(anyhow::Error);

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError(err)
    }
}

pub fn validate_jwt(token: &str) -> Result<Claims, AuthError> {
    let jwt_secret = config_loader::get_jwt_secret()?;

    let decoding_key = DecodingKey::from_secret(jwt_secret.secret.as_bytes());
    let validation = Validation::new(jsonwebtoken::Algorithm::HS256);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| anyhow::anyhow!("JWT validation failed: {}", e))?;

    Ok(token_data.claims)
}

/// Signs an HS256 token for `user_id` that expires [`TOKEN_TTL_HOURS`] after `issued_at`.
pub fn issue_jwt(secret: &str, user_id: i64, issued_at: DateTime<Utc>) -> anyhow::Result<String> {
    let expires_at = issued_at + Duration::hours(TOKEN_TTL_HOURS);
    let claims = Claims {
        user_id,
        exp: expires_at.timestamp() as usize,
        iat: Some(issued_at.timestamp() as usize),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("failed to sign token")
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized("Missing or malformed bearer token"))?;

        let claims = validate_jwt(bearer.token()).map_err(|err| {
            tracing::debug!(auth_error = ?err.0, "auth: rejected token");
            AppError::Unauthorized("Invalid or expired token")
        })?;

        Ok(AuthUser {
            user_id: claims.user_id,
        })
    }
}

#[cfg(test)]
mod tests;
