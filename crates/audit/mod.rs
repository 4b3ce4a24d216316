pub mod activity_logger;
