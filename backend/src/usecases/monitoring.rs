use std::sync::Arc;

use serde::Serialize;
use tracing::{error, warn};
use visa_core::domain::{
    repositories::{job_queue::JobPublisher, users::UserRepository},
    value_objects::notification_jobs::QueueStat,
};

use super::{
    access::ensure_admin,
    errors::{UseCaseError, UseCaseResult},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueHealthDto {
    pub status: String,
    pub connected: bool,
    pub total_messages: u64,
    pub queues: Vec<QueueStat>,
}

pub struct MonitoringUseCase<Q, U>
where
    Q: JobPublisher + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    job_publisher: Arc<Q>,
    user_repo: Arc<U>,
}

impl<Q, U> MonitoringUseCase<Q, U>
where
    Q: JobPublisher + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(job_publisher: Arc<Q>, user_repo: Arc<U>) -> Self {
        Self {
            job_publisher,
            user_repo,
        }
    }

    pub async fn queue_stats(&self, admin_id: i64) -> UseCaseResult<Vec<QueueStat>> {
        ensure_admin(self.user_repo.as_ref(), admin_id).await?;
        self.read_stats().await
    }

    pub async fn queue_health(&self, admin_id: i64) -> UseCaseResult<QueueHealthDto> {
        ensure_admin(self.user_repo.as_ref(), admin_id).await?;

        let queues = self.read_stats().await?;
        let total_messages = queues.iter().map(|q| u64::from(q.messages)).sum();

        Ok(QueueHealthDto {
            status: "healthy".to_string(),
            connected: true,
            total_messages,
            queues,
        })
    }

    async fn read_stats(&self) -> UseCaseResult<Vec<QueueStat>> {
        if !self.job_publisher.is_connected() {
            warn!("monitoring: queue broker connection is down");
            return Err(UseCaseError::Unavailable(
                "queue broker is not connected".to_string(),
            ));
        }

        self.job_publisher.queue_stats().await.map_err(|err| {
            error!(queue_error = ?err, "monitoring: failed to read queue stats");
            UseCaseError::Unavailable("queue broker did not answer".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use visa_core::domain::{
        entities::users::UserEntity,
        repositories::{job_queue::MockJobPublisher, users::MockUserRepository},
    };

    fn admin_repo() -> MockUserRepository {
        user_repo_with_role("admin")
    }

    fn user_repo_with_role(role: &'static str) -> MockUserRepository {
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_id().returning(move |id| {
            let now = Utc::now();
            Ok(Some(UserEntity {
                id,
                email: "ops@viskatera.test".to_string(),
                name: "Ops".to_string(),
                role: role.to_string(),
                is_active: true,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            }))
        });
        user_repo
    }

    #[tokio::test]
    async fn health_sums_messages_across_queues() {
        let mut job_publisher = MockJobPublisher::new();
        job_publisher.expect_is_connected().return_const(true);
        job_publisher.expect_queue_stats().returning(|| {
            Ok(vec![
                QueueStat {
                    queue: "email_invoice".to_string(),
                    messages: 3,
                    consumers: 10,
                },
                QueueStat {
                    queue: "email_payment_success".to_string(),
                    messages: 2,
                    consumers: 10,
                },
            ])
        });

        let usecase = MonitoringUseCase::new(Arc::new(job_publisher), Arc::new(admin_repo()));
        let health = usecase.queue_health(1).await.unwrap();

        assert_eq!(health.total_messages, 5);
        assert!(health.connected);
        assert_eq!(health.queues.len(), 2);
    }

    #[tokio::test]
    async fn disconnected_broker_is_unavailable() {
        let mut job_publisher = MockJobPublisher::new();
        job_publisher.expect_is_connected().return_const(false);
        job_publisher.expect_queue_stats().never();

        let usecase = MonitoringUseCase::new(Arc::new(job_publisher), Arc::new(admin_repo()));
        let err = usecase.queue_health(1).await.unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn customers_cannot_read_queue_stats() {
        let mut job_publisher = MockJobPublisher::new();
        job_publisher.expect_queue_stats().never();

        let usecase = MonitoringUseCase::new(
            Arc::new(job_publisher),
            Arc::new(user_repo_with_role("customer")),
        );
        let err = usecase.queue_stats(3).await.unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }
}
