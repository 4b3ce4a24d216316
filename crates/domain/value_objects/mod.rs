pub mod activities;
pub mod auth;
pub mod audit;
pub mod enums;
pub mod invoices;
pub mod mail;
pub mod notification_jobs;
pub mod pagination;
pub mod payments;
pub mod purchases;
pub mod visas;
