pub mod activities;
pub mod auth;
pub mod monitoring;
pub mod payments;
pub mod purchases;
pub mod visas;
pub mod webhooks;
