use tracing::{error, warn};
use visa_core::domain::{
    entities::users::UserEntity, repositories::users::UserRepository,
    value_objects::enums::user_roles::UserRole,
};

use super::errors::{UseCaseError, UseCaseResult};

/// Loads the caller and requires an active admin account.
pub async fn ensure_admin<U>(user_repo: &U, user_id: i64) -> UseCaseResult<UserEntity>
where
    U: UserRepository + Send + Sync,
{
    let user = user_repo
        .find_by_id(user_id)
        .await
        .map_err(|err| {
            error!(%user_id, db_error = ?err, "access: failed to load user");
            UseCaseError::Persistence(err)
        })?
        .ok_or_else(|| UseCaseError::Unauthorized("user no longer exists".to_string()))?;

    if !user.is_active || UserRole::from_str(&user.role) != UserRole::Admin {
        warn!(%user_id, role = %user.role, "access: admin permission denied");
        return Err(UseCaseError::Forbidden(
            "admin permission required".to_string(),
        ));
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mockall::predicate::eq;
    use visa_core::domain::repositories::users::MockUserRepository;

    fn user(role: &str, is_active: bool) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id: 1,
            email: "ops@viskatera.test".to_string(),
            name: "Ops".to_string(),
            role: role.to_string(),
            is_active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn active_admin_passes() {
        let mut user_repo = MockUserRepository::new();
        let admin = user("admin", true);
        user_repo
            .expect_find_by_id()
            .with(eq(1))
            .returning(move |_| Ok(Some(admin.clone())));

        let found = ensure_admin(&user_repo, 1).await.unwrap();
        assert_eq!(found.role, "admin");
    }

    #[tokio::test]
    async fn customers_and_inactive_admins_are_forbidden() {
        for (role, active) in [("customer", true), ("admin", false)] {
            let mut user_repo = MockUserRepository::new();
            let candidate = user(role, active);
            user_repo
                .expect_find_by_id()
                .returning(move |_| Ok(Some(candidate.clone())));

            let err = ensure_admin(&user_repo, 1).await.unwrap_err();
            assert!(matches!(err, UseCaseError::Forbidden(_)));
        }
    }

    #[tokio::test]
    async fn missing_user_is_unauthorized() {
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_id().returning(|_| Ok(None));

        let err = ensure_admin(&user_repo, 9).await.unwrap_err();
        assert!(matches!(err, UseCaseError::Unauthorized(_)));
    }
}
