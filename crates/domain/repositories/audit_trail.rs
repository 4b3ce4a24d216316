use mockall::automock;

use crate::domain::value_objects::audit::AuditEntry;

/// Fire-and-forget sink for audit entries. Implementations must not block or fail the caller.
#[automock]
pub trait AuditTrail: Send + Sync {
    fn record(&self, entry: AuditEntry);
}
