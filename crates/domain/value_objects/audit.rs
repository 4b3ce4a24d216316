use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::{
    entities::{
        activity_logs::InsertActivityLogEntity, payments::PaymentEntity,
        purchases::PurchaseEntity, users::UserEntity, visas::VisaEntity,
    },
    value_objects::enums::{audit_actions::AuditAction, entity_kinds::EntityKind},
};

/// The record an audit entry is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntity {
    pub kind: EntityKind,
    pub id: i64,
    pub name: String,
}

impl AuditEntity {
    pub fn payment(payment: &PaymentEntity) -> Self {
        Self {
            kind: EntityKind::Payment,
            id: payment.id,
            name: format!("Payment #{} - {}", payment.id, payment.payment_method),
        }
    }

    pub fn purchase(purchase: &PurchaseEntity) -> Self {
        Self {
            kind: EntityKind::Purchase,
            id: purchase.id,
            name: format!("Purchase #{}", purchase.id),
        }
    }

    pub fn user(user: &UserEntity) -> Self {
        Self {
            kind: EntityKind::User,
            id: user.id,
            name: format!("{} ({})", user.name, user.email),
        }
    }

    pub fn visa(visa: &VisaEntity) -> Self {
        Self {
            kind: EntityKind::Visa,
            id: visa.id,
            name: format!("{} - {}", visa.country, visa.visa_type),
        }
    }
}

/// Caller metadata captured from the HTTP request, when there is one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    /// `None` means the change was made by the system (webhooks, workers).
    pub actor_id: Option<i64>,
    pub action: AuditAction,
    pub entity: AuditEntity,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub context: RequestContext,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    fn new(
        actor_id: Option<i64>,
        action: AuditAction,
        entity: AuditEntity,
        old_values: Option<Value>,
        new_values: Option<Value>,
    ) -> Self {
        Self {
            actor_id,
            action,
            entity,
            old_values,
            new_values,
            context: RequestContext::default(),
            recorded_at: Utc::now(),
        }
    }

    pub fn create(actor_id: Option<i64>, entity: AuditEntity, new_values: Value) -> Self {
        Self::new(actor_id, AuditAction::Create, entity, None, Some(new_values))
    }

    pub fn update(
        actor_id: Option<i64>,
        entity: AuditEntity,
        old_values: Value,
        new_values: Value,
    ) -> Self {
        Self::new(
            actor_id,
            AuditAction::Update,
            entity,
            Some(old_values),
            Some(new_values),
        )
    }

    pub fn delete(actor_id: Option<i64>, entity: AuditEntity, old_values: Value) -> Self {
        Self::new(actor_id, AuditAction::Delete, entity, Some(old_values), None)
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    /// Human readable summary, e.g. "Updated payment: Payment #7 - qris".
    pub fn description(&self) -> String {
        format!(
            "{} {}: {}",
            self.action.past_tense(),
            self.entity.kind,
            self.entity.name
        )
    }

    pub fn changes(&self) -> Value {
        let mut changes = Map::new();
        changes.insert(
            "action".to_string(),
            Value::String(self.action.as_str().to_string()),
        );
        if let Some(old_values) = &self.old_values {
            changes.insert("old_values".to_string(), old_values.clone());
        }
        if let Some(new_values) = &self.new_values {
            changes.insert("new_values".to_string(), new_values.clone());
        }
        Value::Object(changes)
    }

    pub fn into_insert_entity(self) -> InsertActivityLogEntity {
        let description = self.description();
        let changes = self.changes();

        InsertActivityLogEntity {
            user_id: self.actor_id,
            action: self.action.as_str().to_string(),
            entity_type: self.entity.kind.as_str().to_string(),
            entity_id: self.entity.id,
            entity_name: self.entity.name,
            description,
            changes,
            ip_address: self.context.ip_address,
            user_agent: self.context.user_agent,
            created_at: self.recorded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payment_entity() -> AuditEntity {
        AuditEntity {
            kind: EntityKind::Payment,
            id: 7,
            name: "Payment #7 - qris".to_string(),
        }
    }

    #[test]
    fn update_entry_describes_change() {
        let entry = AuditEntry::update(
            None,
            payment_entity(),
            json!({"status": "pending"}),
            json!({"status": "paid"}),
        );

        assert_eq!(entry.description(), "Updated payment: Payment #7 - qris");
        assert_eq!(
            entry.changes(),
            json!({
                "action": "update",
                "old_values": {"status": "pending"},
                "new_values": {"status": "paid"},
            })
        );
    }

    #[test]
    fn create_entry_omits_old_values() {
        let entry = AuditEntry::create(Some(3), payment_entity(), json!({"amount": 650000}))
            .with_context(RequestContext {
                ip_address: Some("10.0.0.1".to_string()),
                user_agent: None,
            });

        let row = entry.into_insert_entity();
        assert_eq!(row.user_id, Some(3));
        assert_eq!(row.action, "create");
        assert_eq!(row.entity_type, "payment");
        assert_eq!(row.entity_id, 7);
        assert_eq!(row.ip_address.as_deref(), Some("10.0.0.1"));
        assert!(row.changes.get("old_values").is_none());
        assert_eq!(row.changes["new_values"]["amount"], 650000);
    }
}
