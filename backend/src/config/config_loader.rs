use anyhow::{Context, Result};
use visa_core::{
    audit::activity_logger::DEFAULT_AUDIT_QUEUE_CAPACITY,
    infra::queue::rabbitmq_connection::RabbitMqConfig,
    payments::xendit_client::{DEFAULT_XENDIT_BASE_URL, XenditConfig},
};

use super::{
    config_model::{AuditLog, BackendServer, Database, DotEnvyConfig, JwtSecret},
    stage::Stage,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: std::env::var("SERVER_PORT_BACKEND")
            .expect("SERVER_PORT_BACKEND is invalid")
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

    let xendit = XenditConfig {
        base_url: optional_env("XENDIT_BASE_URL")
            .unwrap_or_else(|| DEFAULT_XENDIT_BASE_URL.to_string()),
        secret_key: std::env::var("XENDIT_SECRET_KEY").expect("XENDIT_SECRET_KEY is invalid"),
        timeout_seconds: std::env::var("XENDIT_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("XENDIT_TIMEOUT_SECONDS is invalid")?,
        success_redirect_url: optional_env("XENDIT_SUCCESS_REDIRECT_URL"),
        failure_redirect_url: optional_env("XENDIT_FAILURE_REDIRECT_URL"),
    };

    let audit_log = AuditLog {
        queue_capacity: std::env::var("AUDIT_LOG_QUEUE_CAPACITY")
            .unwrap_or_else(|_| DEFAULT_AUDIT_QUEUE_CAPACITY.to_string())
            .parse()
            .context("AUDIT_LOG_QUEUE_CAPACITY is invalid")?,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        xendit,
        rabbitmq: load_rabbitmq()?,
        audit_log,
    })
}

pub fn load_rabbitmq() -> Result<RabbitMqConfig> {
    Ok(RabbitMqConfig {
        host: std::env::var("RABBITMQ_HOST").unwrap_or_else(|_| "localhost".to_string()),
        port: std::env::var("RABBITMQ_PORT")
            .unwrap_or_else(|_| "5672".to_string())
            .parse()
            .context("RABBITMQ_PORT is invalid")?,
        user: std::env::var("RABBITMQ_USER").unwrap_or_else(|_| "admin".to_string()),
        password: std::env::var("RABBITMQ_PASS").unwrap_or_else(|_| "admin123".to_string()),
        vhost: std::env::var("RABBITMQ_VHOST").unwrap_or_else(|_| "/".to_string()),
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(&stage_str).unwrap_or_default()
}

pub fn get_jwt_secret() -> Result<JwtSecret> {
    dotenvy::dotenv().ok();

    Ok(JwtSecret {
        secret: std::env::var("JWT_SECRET").context("JWT_SECRET is invalid")?,
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
