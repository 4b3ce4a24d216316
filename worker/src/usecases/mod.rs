pub mod email_templates;
pub mod notification_jobs;
