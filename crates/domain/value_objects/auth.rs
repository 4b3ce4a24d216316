use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::users::UserEntity;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginModel {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginUserDto {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
    pub last_login_at: DateTime<Utc>,
}

impl LoginUserDto {
    pub fn new(user: UserEntity, last_login_at: DateTime<Utc>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            last_login_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginDto {
    pub token: String,
    pub user: LoginUserDto,
}
