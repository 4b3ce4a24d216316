use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::job_queues::JobQueue;

/// Body of every message on the notification queues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationJob {
    pub purchase_id: i64,
    pub user_id: i64,
    pub email: String,
    #[serde(rename = "type")]
    pub job_type: String,
}

impl NotificationJob {
    pub fn new(queue: JobQueue, purchase_id: i64, user_id: i64, email: impl Into<String>) -> Self {
        Self {
            purchase_id,
            user_id,
            email: email.into(),
            job_type: queue.job_type().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStat {
    pub queue: String,
    pub messages: u32,
    pub consumers: u32,
}
