use anyhow::Result;
use std::{sync::Arc, time::Duration};
use tracing::{error, info};
use visa_core::{
    documents::invoice_pdf::PdfInvoiceRenderer,
    infra::{
        db::{
            postgres::postgres_connection,
            repositories::{
                payments::PaymentPostgres, purchases::PurchasePostgres, users::UserPostgres,
                visas::VisaPostgres,
            },
        },
        mail::smtp_mailer::SmtpMailer,
        queue::rabbitmq_connection::{self, declare_job_queues},
        storages::local_invoice_archive::LocalInvoiceArchive,
    },
};
use worker::{
    axum_http::http_serve,
    background_worker::queue_consumer::{self, ConsumerPoolConfig},
    config::config_loader,
    usecases::notification_jobs::{JobProcessor, NotificationJobProcessor},
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Worker exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    visa_core::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config_loader::load()?);
    info!(stage = %config_loader::get_stage(), "ENV has been loaded");

    let postgres_pool = Arc::new(postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        dotenvy_env.database.max_connections,
    )?);
    info!("Postgres connection has been established");

    let rabbitmq = Arc::new(rabbitmq_connection::connect(&dotenvy_env.rabbitmq).await?);
    let setup_channel = rabbitmq.create_channel().await?;
    declare_job_queues(&setup_channel).await?;
    setup_channel.close(200, "queues declared").await?;
    info!("RabbitMQ connection has been established");

    let processor: Arc<dyn JobProcessor> = Arc::new(NotificationJobProcessor::new(
        Arc::new(PurchasePostgres::new(Arc::clone(&postgres_pool))),
        Arc::new(VisaPostgres::new(Arc::clone(&postgres_pool))),
        Arc::new(UserPostgres::new(Arc::clone(&postgres_pool))),
        Arc::new(PaymentPostgres::new(Arc::clone(&postgres_pool))),
        Arc::new(SmtpMailer::new(&dotenvy_env.smtp)?),
        Arc::new(PdfInvoiceRenderer),
        Arc::new(LocalInvoiceArchive::new(&dotenvy_env.storage.upload_dir)),
    ));

    let consumers = tokio::spawn(queue_consumer::run(
        Arc::clone(&rabbitmq),
        processor,
        ConsumerPoolConfig {
            concurrency: dotenvy_env.worker_pool.concurrency,
            requeue_delay: Duration::from_millis(dotenvy_env.worker_pool.requeue_delay_ms),
        },
    ));
    let health_server = tokio::spawn(http_serve::start(Arc::clone(&dotenvy_env)));

    info!(
        concurrency = dotenvy_env.worker_pool.concurrency,
        "Worker started"
    );

    // The health server returns on ctrl-c or SIGTERM; consumers only return when they all die.
    let result = tokio::select! {
        result = consumers => result,
        result = health_server => result,
    };

    if let Err(err) = rabbitmq.close(200, "worker shutting down").await {
        error!(queue_error = ?err, "failed to close RabbitMQ connection");
    }
    info!("Worker stopped");

    result?
}
