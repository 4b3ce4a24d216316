pub mod activity_logs;
pub mod payments;
pub mod purchases;
pub mod users;
pub mod visas;
