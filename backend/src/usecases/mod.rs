pub mod access;
pub mod activities;
pub mod auth;
pub mod errors;
pub mod monitoring;
pub mod payment_gateway;
pub mod payment_reconciliation;
pub mod payments;
pub mod purchases;
pub mod visas;
