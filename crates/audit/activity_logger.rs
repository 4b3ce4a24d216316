use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::domain::{
    repositories::{activity_logs::ActivityLogRepository, audit_trail::AuditTrail},
    value_objects::audit::AuditEntry,
};

pub const DEFAULT_AUDIT_QUEUE_CAPACITY: usize = 256;

/// Bounded, fire-and-forget audit log writer.
///
/// Entries are handed to a single writer task through a bounded channel, so a burst of
/// requests never opens more than one extra database connection for logging. When the
/// channel is full the entry is dropped with a warning; insert failures are only logged.
#[derive(Clone)]
pub struct ActivityLogger {
    tx: mpsc::Sender<AuditEntry>,
}

impl ActivityLogger {
    pub fn spawn(
        repository: Arc<dyn ActivityLogRepository + Send + Sync>,
        capacity: usize,
    ) -> Self {
        let (logger, mut rx) = Self::channel(capacity);

        tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                let entity_type = entry.entity.kind;
                let entity_id = entry.entity.id;

                match repository.insert(entry.into_insert_entity()).await {
                    Ok(log_id) => {
                        debug!(log_id, %entity_type, entity_id, "activity_logger: entry written")
                    }
                    Err(err) => error!(
                        %entity_type,
                        entity_id,
                        db_error = ?err,
                        "activity_logger: failed to write entry"
                    ),
                }
            }
            debug!("activity_logger: channel closed, writer stopped");
        });

        logger
    }

    fn channel(capacity: usize) -> (Self, mpsc::Receiver<AuditEntry>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl AuditTrail for ActivityLogger {
    fn record(&self, entry: AuditEntry) {
        match self.tx.try_send(entry) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(entry)) => {
                warn!(
                    entity_type = %entry.entity.kind,
                    entity_id = entry.entity.id,
                    "activity_logger: queue full; dropping entry"
                );
            }
            Err(mpsc::error::TrySendError::Closed(entry)) => {
                warn!(
                    entity_type = %entry.entity.kind,
                    entity_id = entry.entity.id,
                    "activity_logger: queue closed; dropping entry"
                );
            }
        }
    }
}
