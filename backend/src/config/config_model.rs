use visa_core::{
    infra::queue::rabbitmq_connection::RabbitMqConfig, payments::xendit_client::XenditConfig,
};

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub xendit: XenditConfig,
    pub rabbitmq: RabbitMqConfig,
    pub audit_log: AuditLog,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AuditLog {
    pub queue_capacity: usize,
}

#[derive(Debug, Clone)]
pub struct JwtSecret {
    pub secret: String,
}
