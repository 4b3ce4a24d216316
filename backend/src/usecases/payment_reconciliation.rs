use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, info, warn};
use visa_core::domain::{
    entities::{payments::PaymentEntity, purchases::PurchaseEntity},
    repositories::{
        audit_trail::AuditTrail, job_queue::JobPublisher, payments::PaymentRepository,
        purchases::PurchaseRepository, users::UserRepository,
    },
    value_objects::{
        audit::{AuditEntity, AuditEntry},
        enums::{
            job_queues::JobQueue,
            payment_statuses::{PaymentStatus, map_gateway_status},
            purchase_statuses::PurchaseStatus,
        },
        notification_jobs::NotificationJob,
        payments::{WebhookResultDto, XenditWebhookPayload},
    },
};

use super::errors::{UseCaseError, UseCaseResult};

/// Applies gateway-reported invoice states to local payments and purchases.
///
/// Shared by the webhook receiver and the status poll. Every status write is a
/// compare-and-set on the previous value, so a notification that repeats or races
/// another one produces no second purchase transition, audit entry or job.
pub struct PaymentReconciler<Pay, Pur, U, Q>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    Pur: PurchaseRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    Q: JobPublisher + Send + Sync + 'static,
{
    payment_repo: Arc<Pay>,
    purchase_repo: Arc<Pur>,
    user_repo: Arc<U>,
    job_publisher: Arc<Q>,
    audit_trail: Arc<dyn AuditTrail>,
}

impl<Pay, Pur, U, Q> PaymentReconciler<Pay, Pur, U, Q>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    Pur: PurchaseRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    Q: JobPublisher + Send + Sync + 'static,
{
    pub fn new(
        payment_repo: Arc<Pay>,
        purchase_repo: Arc<Pur>,
        user_repo: Arc<U>,
        job_publisher: Arc<Q>,
        audit_trail: Arc<dyn AuditTrail>,
    ) -> Self {
        Self {
            payment_repo,
            purchase_repo,
            user_repo,
            job_publisher,
            audit_trail,
        }
    }

    /// Handles a raw Xendit invoice callback. The invoice id is the only lookup key.
    pub async fn handle_xendit_webhook(&self, body: &[u8]) -> UseCaseResult<WebhookResultDto> {
        let payload: XenditWebhookPayload = serde_json::from_slice(body).map_err(|err| {
            warn!(parse_error = %err, "reconciliation: malformed xendit webhook payload");
            UseCaseError::Validation(format!("invalid webhook payload: {err}"))
        })?;

        let gateway_id = payload.id.trim();
        if gateway_id.is_empty() || payload.status.trim().is_empty() {
            warn!("reconciliation: webhook payload without invoice id or status");
            return Err(UseCaseError::Validation(
                "webhook payload requires id and status".to_string(),
            ));
        }

        info!(
            %gateway_id,
            reported_status = %payload.status,
            external_id = ?payload.external_id,
            "reconciliation: xendit webhook received"
        );

        let payment = self
            .payment_repo
            .find_by_gateway_id(gateway_id)
            .await
            .map_err(|err| {
                error!(%gateway_id, db_error = ?err, "reconciliation: failed to load payment");
                UseCaseError::Persistence(err)
            })?
            .ok_or_else(|| {
                warn!(%gateway_id, "reconciliation: no payment for gateway invoice");
                UseCaseError::NotFound("payment")
            })?;

        let payment = self
            .apply_gateway_status(payment, &payload.status, None)
            .await?;

        Ok(WebhookResultDto {
            payment_id: payment.id,
            status: payment.status,
        })
    }

    /// Moves `payment` to the status the gateway reported and runs the follow-ups of
    /// that transition. Returns the payment as stored afterwards.
    ///
    /// `actor_id` is the user who triggered the check, `None` for gateway callbacks.
    pub async fn apply_gateway_status(
        &self,
        payment: PaymentEntity,
        reported_status: &str,
        actor_id: Option<i64>,
    ) -> UseCaseResult<PaymentEntity> {
        let payment_id = payment.id;
        let new_status = map_gateway_status(reported_status);

        if payment.status == new_status {
            debug!(payment_id, status = %new_status, "reconciliation: status unchanged");
            return Ok(payment);
        }

        let Some(mapped) = PaymentStatus::from_str(&new_status) else {
            info!(
                payment_id,
                %reported_status,
                current_status = %payment.status,
                "reconciliation: gateway status has no local counterpart, payment left as is"
            );
            return Ok(payment);
        };

        if PaymentStatus::from_str(&payment.status).is_some_and(|current| current.is_terminal()) {
            warn!(
                payment_id,
                current_status = %payment.status,
                %reported_status,
                "reconciliation: payment already final, ignoring reported status"
            );
            return Ok(payment);
        }

        // Purchase first: once the payment reads `paid`, later reports short-circuit
        // above and would never complete it.
        let purchase = if mapped == PaymentStatus::Paid {
            self.complete_purchase(&payment, actor_id).await?
        } else {
            None
        };

        let changed = self
            .payment_repo
            .update_status_if(payment_id, &payment.status, mapped.as_str())
            .await
            .map_err(|err| {
                error!(payment_id, db_error = ?err, "reconciliation: failed to update payment status");
                UseCaseError::Persistence(err)
            })?;

        if !changed {
            info!(payment_id, "reconciliation: payment changed concurrently, reloading");
            return self
                .payment_repo
                .find_by_id(payment_id)
                .await
                .map_err(|err| {
                    error!(payment_id, db_error = ?err, "reconciliation: failed to reload payment");
                    UseCaseError::Persistence(err)
                })?
                .ok_or(UseCaseError::NotFound("payment"));
        }

        info!(
            payment_id,
            old_status = %payment.status,
            new_status = %mapped,
            "reconciliation: payment status updated"
        );

        self.audit_trail.record(AuditEntry::update(
            actor_id,
            AuditEntity::payment(&payment),
            json!({ "status": payment.status }),
            json!({ "status": mapped.as_str() }),
        ));

        let updated = PaymentEntity {
            status: mapped.as_str().to_string(),
            updated_at: Utc::now(),
            ..payment
        };

        if let Some(purchase) = purchase {
            self.enqueue_payment_success(&updated, &purchase).await;
        }

        Ok(updated)
    }

    async fn complete_purchase(
        &self,
        payment: &PaymentEntity,
        actor_id: Option<i64>,
    ) -> UseCaseResult<Option<PurchaseEntity>> {
        let purchase_id = payment.purchase_id;
        let Some(purchase) = self
            .purchase_repo
            .find_by_id(purchase_id)
            .await
            .map_err(|err| {
                error!(purchase_id, db_error = ?err, "reconciliation: failed to load purchase");
                UseCaseError::Persistence(err)
            })?
        else {
            warn!(
                purchase_id,
                payment_id = payment.id,
                "reconciliation: paid payment has no purchase, skipping completion"
            );
            return Ok(None);
        };

        match PurchaseStatus::from_str(&purchase.status) {
            Some(PurchaseStatus::Pending) => {
                let changed = self
                    .purchase_repo
                    .update_status_if(
                        purchase_id,
                        PurchaseStatus::Pending.as_str(),
                        PurchaseStatus::Completed.as_str(),
                    )
                    .await
                    .map_err(|err| {
                        error!(purchase_id, db_error = ?err, "reconciliation: failed to complete purchase");
                        UseCaseError::Persistence(err)
                    })?;

                if changed {
                    info!(purchase_id, "reconciliation: purchase completed");
                    self.audit_trail.record(AuditEntry::update(
                        actor_id,
                        AuditEntity::purchase(&purchase),
                        json!({ "status": purchase.status }),
                        json!({ "status": PurchaseStatus::Completed.as_str() }),
                    ));
                } else {
                    debug!(purchase_id, "reconciliation: purchase changed concurrently");
                }
            }
            Some(PurchaseStatus::Completed) => {
                debug!(purchase_id, "reconciliation: purchase already completed");
            }
            _ => {
                warn!(
                    purchase_id,
                    status = %purchase.status,
                    "reconciliation: payment settled for a purchase that cannot complete"
                );
            }
        }

        Ok(Some(purchase))
    }

    async fn enqueue_payment_success(&self, payment: &PaymentEntity, purchase: &PurchaseEntity) {
        let user_id = payment.user_id;
        let user = match self.user_repo.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(%user_id, purchase_id = purchase.id, "reconciliation: user missing, payment_success not enqueued");
                return;
            }
            Err(err) => {
                error!(%user_id, db_error = ?err, "reconciliation: failed to load user for notification");
                return;
            }
        };

        let job = NotificationJob::new(JobQueue::EmailPaymentSuccess, purchase.id, user.id, user.email);
        match self
            .job_publisher
            .publish(JobQueue::EmailPaymentSuccess, job)
            .await
        {
            Ok(()) => info!(
                purchase_id = purchase.id,
                %user_id,
                "reconciliation: payment_success job enqueued"
            ),
            Err(err) => error!(
                purchase_id = purchase.id,
                %user_id,
                queue_error = ?err,
                "reconciliation: failed to enqueue payment_success job"
            ),
        }
    }
}
