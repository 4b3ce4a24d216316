use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::activity_logs::ActivityLogEntity;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityLogQuery {
    pub user_id: Option<i64>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Predicates applied to the activity log; `None` fields are not filtered on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityLogFilter {
    pub user_id: Option<i64>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityLogDto {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: i64,
    pub entity_name: String,
    pub description: String,
    pub changes: serde_json::Value,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityLogEntity> for ActivityLogDto {
    fn from(value: ActivityLogEntity) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            action: value.action,
            entity_type: value.entity_type,
            entity_id: value.entity_id,
            entity_name: value.entity_name,
            description: value.description,
            changes: value.changes,
            ip_address: value.ip_address,
            user_agent: value.user_agent,
            created_at: value.created_at,
        }
    }
}
