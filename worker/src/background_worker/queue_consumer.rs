use anyhow::{Context, Result, bail};
use futures_util::StreamExt;
use lapin::{
    Channel, Connection, Consumer,
    message::Delivery,
    options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions},
    types::FieldTable,
};
use std::{sync::Arc, time::Duration};
use tokio::{sync::Mutex, task::JoinSet};
use tracing::{error, info, warn};
use visa_core::domain::value_objects::enums::job_queues::JobQueue;

use crate::usecases::notification_jobs::{JobOutcome, JobProcessor};

/// `generate_pdf` is declared but nobody consumes it yet.
pub const CONSUMED_QUEUES: [JobQueue; 2] = [JobQueue::EmailInvoice, JobQueue::EmailPaymentSuccess];

#[derive(Debug, Clone, Copy)]
pub struct ConsumerPoolConfig {
    pub concurrency: u16,
    pub requeue_delay: Duration,
}

/// Runs `concurrency` workers per consumed queue until every worker has stopped.
/// Workers are never restarted.
pub async fn run(
    connection: Arc<Connection>,
    processor: Arc<dyn JobProcessor>,
    config: ConsumerPoolConfig,
) -> Result<()> {
    let mut workers = JoinSet::new();

    for queue in CONSUMED_QUEUES {
        let (channel, consumer) = open_consumer(&connection, queue, config.concurrency).await?;
        let consumer = Arc::new(Mutex::new(consumer));

        for worker_id in 0..config.concurrency {
            workers.spawn(consume_loop(
                queue,
                worker_id,
                channel.clone(),
                Arc::clone(&consumer),
                Arc::clone(&processor),
                config.requeue_delay,
            ));
        }

        info!(
            %queue,
            workers = config.concurrency,
            "queue_consumer: workers started"
        );
    }

    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok((queue, worker_id)) => {
                warn!(%queue, worker_id, "queue_consumer: worker stopped")
            }
            Err(err) => error!(error = %err, "queue_consumer: worker task failed"),
        }
    }

    bail!("all queue workers have stopped")
}

/// One channel per queue; the prefetch bounds unacked deliveries to the worker count.
async fn open_consumer(
    connection: &Connection,
    queue: JobQueue,
    prefetch: u16,
) -> Result<(Channel, Consumer)> {
    let channel = connection
        .create_channel()
        .await
        .with_context(|| format!("failed to open channel for {queue}"))?;

    channel
        .basic_qos(prefetch, BasicQosOptions::default())
        .await
        .with_context(|| format!("failed to set prefetch for {queue}"))?;

    let consumer = channel
        .basic_consume(
            queue.as_str(),
            &format!("visa-worker-{}", queue),
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await
        .with_context(|| format!("failed to start consuming {queue}"))?;

    Ok((channel, consumer))
}

async fn consume_loop(
    queue: JobQueue,
    worker_id: u16,
    // Held so the channel outlives the consumer it feeds.
    _channel: Channel,
    consumer: Arc<Mutex<Consumer>>,
    processor: Arc<dyn JobProcessor>,
    requeue_delay: Duration,
) -> (JobQueue, u16) {
    loop {
        let next = { consumer.lock().await.next().await };

        let delivery = match next {
            Some(Ok(delivery)) => delivery,
            Some(Err(err)) => {
                error!(%queue, worker_id, error = %err, "queue_consumer: consumer error");
                break;
            }
            None => {
                info!(%queue, worker_id, "queue_consumer: consumer stream closed");
                break;
            }
        };

        let outcome = processor.process(queue, &delivery.data).await;
        if let Err(err) = settle(queue, worker_id, &delivery, outcome, requeue_delay).await {
            error!(
                %queue,
                worker_id,
                delivery_tag = delivery.delivery_tag,
                error = %err,
                "queue_consumer: failed to settle delivery"
            );
        }
    }

    (queue, worker_id)
}

async fn settle(
    queue: JobQueue,
    worker_id: u16,
    delivery: &Delivery,
    outcome: JobOutcome,
    requeue_delay: Duration,
) -> Result<()> {
    match outcome {
        JobOutcome::Ack => {
            delivery
                .acker
                .ack(BasicAckOptions::default())
                .await
                .context("ack failed")?;
        }
        JobOutcome::Reject { requeue } => {
            if requeue {
                warn!(
                    %queue,
                    worker_id,
                    delivery_tag = delivery.delivery_tag,
                    redelivered = delivery.redelivered,
                    delay_ms = requeue_delay.as_millis() as u64,
                    "queue_consumer: requeueing delivery"
                );
                tokio::time::sleep(requeue_delay).await;
            } else {
                warn!(
                    %queue,
                    worker_id,
                    delivery_tag = delivery.delivery_tag,
                    redelivered = delivery.redelivered,
                    "queue_consumer: rejecting delivery without requeue"
                );
            }

            delivery
                .acker
                .nack(BasicNackOptions {
                    requeue,
                    multiple: false,
                })
                .await
                .context("nack failed")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_pdf_is_never_consumed() {
        assert!(!CONSUMED_QUEUES.contains(&JobQueue::GeneratePdf));
        assert_eq!(CONSUMED_QUEUES.len(), JobQueue::ALL.len() - 1);
    }
}
