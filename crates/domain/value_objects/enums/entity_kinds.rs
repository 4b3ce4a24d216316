use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Record types the activity log can describe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Visa,
    Purchase,
    Payment,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Visa => "visa",
            EntityKind::Purchase => "purchase",
            EntityKind::Payment => "payment",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "user" => Some(EntityKind::User),
            "visa" => Some(EntityKind::Visa),
            "purchase" => Some(EntityKind::Purchase),
            "payment" => Some(EntityKind::Payment),
            _ => None,
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
