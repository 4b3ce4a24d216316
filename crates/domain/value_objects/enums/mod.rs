pub mod audit_actions;
pub mod entity_kinds;
pub mod job_queues;
pub mod payment_methods;
pub mod payment_statuses;
pub mod purchase_statuses;
pub mod user_roles;
