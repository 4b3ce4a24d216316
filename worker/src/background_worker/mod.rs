pub mod queue_consumer;
