use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use lapin::{
    BasicProperties, Channel, Connection,
    options::{BasicPublishOptions, ConfirmSelectOptions, QueueDeclareOptions},
};
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    domain::{
        repositories::job_queue::JobPublisher,
        value_objects::{
            enums::job_queues::JobQueue,
            notification_jobs::{NotificationJob, QueueStat},
        },
    },
    infra::queue::rabbitmq_connection::job_queue_arguments,
};

const PERSISTENT_DELIVERY: u8 = 2;

pub struct RabbitMqPublisher {
    connection: Arc<Connection>,
    channel: Channel,
}

impl RabbitMqPublisher {
    pub async fn new(connection: Arc<Connection>) -> Result<Self> {
        let channel = connection
            .create_channel()
            .await
            .context("failed to open publisher channel")?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .context("failed to enable publisher confirms")?;

        Ok(Self {
            connection,
            channel,
        })
    }
}

#[async_trait]
impl JobPublisher for RabbitMqPublisher {
    async fn publish(&self, queue: JobQueue, job: NotificationJob) -> Result<()> {
        let body = serde_json::to_vec(&job)?;

        let confirmation = self
            .channel
            .basic_publish(
                "",
                queue.as_str(),
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default()
                    .with_delivery_mode(PERSISTENT_DELIVERY)
                    .with_content_type("application/json".into()),
            )
            .await
            .map_err(|err| {
                error!(queue = %queue, purchase_id = job.purchase_id, error = %err, "rabbitmq: publish failed");
                err
            })?
            .await
            .with_context(|| format!("publish to {queue} was not confirmed"))?;

        if confirmation.is_nack() {
            bail!("broker rejected job for {queue}");
        }

        info!(
            queue = %queue,
            purchase_id = job.purchase_id,
            user_id = job.user_id,
            "rabbitmq: job published"
        );
        Ok(())
    }

    async fn queue_stats(&self) -> Result<Vec<QueueStat>> {
        // Passive declares close the channel when a queue is missing, so use a throwaway one.
        let channel = self
            .connection
            .create_channel()
            .await
            .context("failed to open inspection channel")?;

        let mut stats = Vec::with_capacity(JobQueue::ALL.len());
        for queue in JobQueue::ALL {
            let declared = channel
                .queue_declare(
                    queue.as_str(),
                    QueueDeclareOptions {
                        passive: true,
                        durable: true,
                        ..Default::default()
                    },
                    job_queue_arguments(),
                )
                .await
                .with_context(|| format!("failed to inspect queue {queue}"))?;

            stats.push(QueueStat {
                queue: queue.as_str().to_string(),
                messages: declared.message_count(),
                consumers: declared.consumer_count(),
            });
        }

        channel.close(200, "OK").await.ok();
        Ok(stats)
    }

    fn is_connected(&self) -> bool {
        self.connection.status().connected()
    }
}
