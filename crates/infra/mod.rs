pub mod db;
pub mod mail;
pub mod queue;
pub mod storages;
