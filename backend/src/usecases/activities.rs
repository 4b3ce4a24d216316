use std::sync::Arc;

use tracing::error;
use visa_core::domain::{
    repositories::{activity_logs::ActivityLogRepository, users::UserRepository},
    value_objects::{
        activities::{ActivityLogDto, ActivityLogFilter, ActivityLogQuery},
        enums::{audit_actions::AuditAction, entity_kinds::EntityKind},
        pagination::{Pagination, PaginationMeta, PaginationQuery},
    },
};

use super::{
    access::ensure_admin,
    errors::{UseCaseError, UseCaseResult},
};

pub const DEFAULT_ACTIVITIES_PER_PAGE: i64 = 20;

pub struct ActivityUseCase<A, U>
where
    A: ActivityLogRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    activity_repo: Arc<A>,
    user_repo: Arc<U>,
}

impl<A, U> ActivityUseCase<A, U>
where
    A: ActivityLogRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(activity_repo: Arc<A>, user_repo: Arc<U>) -> Self {
        Self {
            activity_repo,
            user_repo,
        }
    }

    /// The caller's own trail. Looking at another user's trail requires admin.
    pub async fn list_activities(
        &self,
        user_id: i64,
        query: ActivityLogQuery,
    ) -> UseCaseResult<(Vec<ActivityLogDto>, PaginationMeta)> {
        let target_user_id = match query.user_id {
            Some(other) if other != user_id => {
                ensure_admin(self.user_repo.as_ref(), user_id).await?;
                other
            }
            _ => user_id,
        };

        let action = parse_filter(query.action, "action", |v| AuditAction::from_str(v).is_some())?;
        let entity_type =
            parse_filter(query.entity_type, "entity_type", |v| EntityKind::from_str(v).is_some())?;

        let filter = ActivityLogFilter {
            user_id: Some(target_user_id),
            action,
            entity_type,
            entity_id: None,
        };
        let pagination = Pagination::from_query(
            &PaginationQuery {
                page: query.page,
                per_page: query.per_page,
            },
            DEFAULT_ACTIVITIES_PER_PAGE,
        );

        self.list(filter, pagination).await
    }

    pub async fn list_entity_activities(
        &self,
        admin_id: i64,
        entity_type: &str,
        entity_id: i64,
        query: PaginationQuery,
    ) -> UseCaseResult<(Vec<ActivityLogDto>, PaginationMeta)> {
        ensure_admin(self.user_repo.as_ref(), admin_id).await?;

        let kind = EntityKind::from_str(entity_type).ok_or_else(|| {
            UseCaseError::Validation(format!("unknown entity type {entity_type}"))
        })?;

        let filter = ActivityLogFilter {
            entity_type: Some(kind.as_str().to_string()),
            entity_id: Some(entity_id),
            ..Default::default()
        };

        self.list(
            filter,
            Pagination::from_query(&query, DEFAULT_ACTIVITIES_PER_PAGE),
        )
        .await
    }

    async fn list(
        &self,
        filter: ActivityLogFilter,
        pagination: Pagination,
    ) -> UseCaseResult<(Vec<ActivityLogDto>, PaginationMeta)> {
        let (rows, total) = self
            .activity_repo
            .list(filter.clone(), pagination)
            .await
            .map_err(|err| {
                error!(?filter, db_error = ?err, "activities: failed to list activity logs");
                UseCaseError::Persistence(err)
            })?;

        Ok((
            rows.into_iter().map(ActivityLogDto::from).collect(),
            pagination.meta(total),
        ))
    }
}

fn parse_filter(
    value: Option<String>,
    field: &str,
    is_known: impl Fn(&str) -> bool,
) -> UseCaseResult<Option<String>> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) if is_known(&v) => Ok(Some(v)),
        Some(v) => Err(UseCaseError::Validation(format!("unknown {field} {v}"))),
        None => Ok(None),
    }
}
