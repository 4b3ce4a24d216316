use visa_core::infra::{mail::smtp_mailer::SmtpConfig, queue::rabbitmq_connection::RabbitMqConfig};

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub rabbitmq: RabbitMqConfig,
    pub worker_pool: WorkerPool,
    pub smtp: SmtpConfig,
    pub storage: Storage,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub timeout: u64,
    pub body_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct WorkerPool {
    /// Consumers per queue, also the channel prefetch.
    pub concurrency: u16,
    pub requeue_delay_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Storage {
    pub upload_dir: String,
}
