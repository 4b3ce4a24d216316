use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::{
    enums::job_queues::JobQueue,
    notification_jobs::{NotificationJob, QueueStat},
};

#[automock]
#[async_trait]
pub trait JobPublisher {
    async fn publish(&self, queue: JobQueue, job: NotificationJob) -> Result<()>;

    async fn queue_stats(&self) -> Result<Vec<QueueStat>>;

    fn is_connected(&self) -> bool;
}
