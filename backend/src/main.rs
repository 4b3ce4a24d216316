use anyhow::Result;
use backend::axum_http::http_serve;
use backend::config::config_loader;
use std::sync::Arc;
use tracing::{error, info};
use visa_core::{
    audit::activity_logger::ActivityLogger,
    domain::repositories::audit_trail::AuditTrail,
    infra::{
        db::{
            postgres::postgres_connection,
            repositories::activity_logs::ActivityLogPostgres,
        },
        queue::{
            rabbitmq_connection::{self, declare_job_queues},
            rabbitmq_publisher::RabbitMqPublisher,
        },
    },
    payments::xendit_client::XenditClient,
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Backend exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    visa_core::observability::init_observability("backend")?;

    let dotenvy_env = config_loader::load()?;
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

    let job_publisher = Arc::new(RabbitMqPublisher::new(Arc::clone(&rabbitmq)).await?);

    let activity_logger: Arc<dyn AuditTrail> = Arc::new(ActivityLogger::spawn(
        Arc::new(ActivityLogPostgres::new(Arc::clone(&postgres_pool))),
        dotenvy_env.audit_log.queue_capacity,
    ));

    let xendit_client = Arc::new(XenditClient::new(dotenvy_env.xendit.clone())?);

    let served = http_serve::start(
        Arc::new(dotenvy_env),
        postgres_pool,
        job_publisher,
        activity_logger,
        xendit_client,
    )
    .await;

    if let Err(err) = rabbitmq.close(200, "backend shutting down").await {
        error!(queue_error = ?err, "failed to close RabbitMQ connection");
    }
    info!("Backend stopped");

    served
}
