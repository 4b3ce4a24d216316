use crate::config::stage::Stage;

use super::config_model::{Database, DotEnvyConfig, Storage, WorkerPool, WorkerServer};
use anyhow::{Context, Result};
use visa_core::infra::{mail::smtp_mailer::SmtpConfig, queue::rabbitmq_connection::RabbitMqConfig};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: std::env::var("SERVER_PORT_WORKER")
            .expect("SERVER_PORT_WORKER is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
        max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS is invalid")?,
    };

    let rabbitmq = RabbitMqConfig {
        host: std::env::var("RABBITMQ_HOST").unwrap_or_else(|_| "localhost".to_string()),
        port: std::env::var("RABBITMQ_PORT")
            .unwrap_or_else(|_| "5672".to_string())
            .parse()
            .context("RABBITMQ_PORT is invalid")?,
        user: std::env::var("RABBITMQ_USER").unwrap_or_else(|_| "admin".to_string()),
        password: std::env::var("RABBITMQ_PASS").unwrap_or_else(|_| "admin123".to_string()),
        vhost: std::env::var("RABBITMQ_VHOST").unwrap_or_else(|_| "/".to_string()),
    };

    let worker_pool = WorkerPool {
        concurrency: std::env::var("WORKER_CONCURRENCY")
            .ok()
            .and_then(|v| v.trim().parse::<u16>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(10),
        requeue_delay_ms: std::env::var("WORKER_REQUEUE_DELAY_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .context("WORKER_REQUEUE_DELAY_MS is invalid")?,
    };

    let smtp = SmtpConfig {
        host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
        port: std::env::var("SMTP_PORT")
            .unwrap_or_else(|_| "1025".to_string())
            .parse()
            .context("SMTP_PORT is invalid")?,
        user: optional_env("SMTP_USER"),
        password: optional_env("SMTP_PASS"),
        from: std::env::var("SMTP_FROM").unwrap_or_else(|_| "noreply@viskatera.com".to_string()),
    };

    let storage = Storage {
        upload_dir: optional_env("UPLOAD_DIR").unwrap_or_else(|| "./uploads".to_string()),
    };

    Ok(DotEnvyConfig {
        worker_server,
        database,
        rabbitmq,
        worker_pool,
        smtp,
        storage,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(&stage_str).unwrap_or_default()
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
