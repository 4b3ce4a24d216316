pub mod rabbitmq_connection;
pub mod rabbitmq_publisher;
