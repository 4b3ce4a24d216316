pub mod activity_logs;
pub mod audit_trail;
pub mod invoices;
pub mod job_queue;
pub mod mail;
pub mod payments;
pub mod purchases;
pub mod users;
pub mod visas;
