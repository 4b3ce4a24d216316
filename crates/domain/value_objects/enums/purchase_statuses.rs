use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Completed => "completed",
            PurchaseStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PurchaseStatus::Pending),
            "completed" => Some(PurchaseStatus::Completed),
            "cancelled" => Some(PurchaseStatus::Cancelled),
            _ => None,
        }
    }

    /// Purchases only move forward: pending can complete or be cancelled, nothing reopens.
    pub fn can_transition_to(&self, next: PurchaseStatus) -> bool {
        matches!(
            (self, next),
            (PurchaseStatus::Pending, PurchaseStatus::Completed)
                | (PurchaseStatus::Pending, PurchaseStatus::Cancelled)
        )
    }
}

impl Display for PurchaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_moves_forward_only() {
        assert!(PurchaseStatus::Pending.can_transition_to(PurchaseStatus::Completed));
        assert!(PurchaseStatus::Pending.can_transition_to(PurchaseStatus::Cancelled));
        assert!(!PurchaseStatus::Completed.can_transition_to(PurchaseStatus::Pending));
        assert!(!PurchaseStatus::Cancelled.can_transition_to(PurchaseStatus::Completed));
        assert!(!PurchaseStatus::Pending.can_transition_to(PurchaseStatus::Pending));
    }
}
