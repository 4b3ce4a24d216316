use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};
use visa_core::{
    domain::{
        entities::payments::InsertPaymentEntity,
        repositories::{
            audit_trail::AuditTrail, job_queue::JobPublisher, payments::PaymentRepository,
            purchases::PurchaseRepository, users::UserRepository, visas::VisaRepository,
        },
        value_objects::{
            audit::{AuditEntity, AuditEntry, RequestContext},
            enums::{
                job_queues::JobQueue,
                payment_statuses::{PaymentStatus, map_gateway_status},
                purchase_statuses::PurchaseStatus,
            },
            notification_jobs::NotificationJob,
            payments::{CreatePaymentModel, PaymentDto},
        },
    },
    payments::xendit_client::{CreateInvoiceRequest, XenditCustomer, XenditInvoiceItem},
};

use super::{
    errors::{UseCaseError, UseCaseResult},
    payment_gateway::PaymentGateway,
    payment_reconciliation::PaymentReconciler,
};

const INVOICE_CURRENCY: &str = "IDR";

pub struct PaymentUseCase<Pay, Pur, V, U, Q, G>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    Pur: PurchaseRepository + Send + Sync + 'static,
    V: VisaRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    Q: JobPublisher + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    payment_repo: Arc<Pay>,
    purchase_repo: Arc<Pur>,
    visa_repo: Arc<V>,
    user_repo: Arc<U>,
    job_publisher: Arc<Q>,
    gateway: Arc<G>,
    audit_trail: Arc<dyn AuditTrail>,
    reconciler: PaymentReconciler<Pay, Pur, U, Q>,
}

impl<Pay, Pur, V, U, Q, G> PaymentUseCase<Pay, Pur, V, U, Q, G>
where
    Pay: PaymentRepository + Send + Sync + 'static,
    Pur: PurchaseRepository + Send + Sync + 'static,
    V: VisaRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    Q: JobPublisher + Send + Sync + 'static,
    G: PaymentGateway + 'static,
{
    pub fn new(
        payment_repo: Arc<Pay>,
        purchase_repo: Arc<Pur>,
        visa_repo: Arc<V>,
        user_repo: Arc<U>,
        job_publisher: Arc<Q>,
        gateway: Arc<G>,
        audit_trail: Arc<dyn AuditTrail>,
    ) -> Self {
        let reconciler = PaymentReconciler::new(
            Arc::clone(&payment_repo),
            Arc::clone(&purchase_repo),
            Arc::clone(&user_repo),
            Arc::clone(&job_publisher),
            Arc::clone(&audit_trail),
        );

        Self {
            payment_repo,
            purchase_repo,
            visa_repo,
            user_repo,
            job_publisher,
            gateway,
            audit_trail,
            reconciler,
        }
    }

    pub async fn create_payment(
        &self,
        user_id: i64,
        model: CreatePaymentModel,
        context: RequestContext,
    ) -> UseCaseResult<PaymentDto> {
        let purchase_id = model.purchase_id;
        info!(%user_id, purchase_id, method = %model.payment_method, "payments: creating payment");

        let purchase = self
            .purchase_repo
            .find_by_id_for_user(purchase_id, user_id)
            .await
            .map_err(|err| {
                error!(%user_id, purchase_id, db_error = ?err, "payments: failed to load purchase");
                UseCaseError::Persistence(err)
            })?
            .ok_or(UseCaseError::NotFound("purchase"))?;

        if PurchaseStatus::from_str(&purchase.status) != Some(PurchaseStatus::Pending) {
            warn!(purchase_id, status = %purchase.status, "payments: purchase is not payable");
            return Err(UseCaseError::Validation(format!(
                "purchase is {}, only pending purchases can be paid",
                purchase.status
            )));
        }

        let visa = self
            .visa_repo
            .find_by_id(purchase.visa_id)
            .await
            .map_err(|err| {
                error!(visa_id = purchase.visa_id, db_error = ?err, "payments: failed to load visa");
                UseCaseError::Persistence(err)
            })?
            .ok_or(UseCaseError::NotFound("visa"))?;

        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "payments: failed to load user");
                UseCaseError::Persistence(err)
            })?
            .ok_or_else(|| UseCaseError::Unauthorized("user no longer exists".to_string()))?;

        let customer_name = non_blank(model.customer_name).unwrap_or(user.name);
        let customer_email = non_blank(model.customer_email).unwrap_or(user.email);
        let item_name = visa.label();
        let (success_redirect_url, failure_redirect_url) = self.gateway.redirect_urls();

        let request = CreateInvoiceRequest {
            external_id: format!("payment_{}_{}", purchase.id, Utc::now().timestamp()),
            amount: purchase.total_price,
            description: format!("Payment for {item_name}"),
            currency: INVOICE_CURRENCY.to_string(),
            payer_email: Some(customer_email.clone()),
            payment_methods: model
                .payment_method
                .gateway_channels(model.bank_code.as_deref()),
            success_redirect_url,
            failure_redirect_url,
            customer: Some(XenditCustomer {
                given_names: customer_name,
                email: Some(customer_email.clone()),
            }),
            items: vec![XenditInvoiceItem {
                name: item_name,
                quantity: 1,
                price: purchase.total_price,
            }],
        };

        let invoice = self.gateway.create_invoice(&request).await.map_err(|err| {
            error!(purchase_id, external_id = %request.external_id, gateway_error = ?err, "payments: failed to create gateway invoice");
            UseCaseError::Gateway(err)
        })?;

        let status = PaymentStatus::from_str(&map_gateway_status(&invoice.status))
            .unwrap_or(PaymentStatus::Pending);
        let now = Utc::now();

        let payment = self
            .payment_repo
            .create(InsertPaymentEntity {
                user_id,
                purchase_id: purchase.id,
                payment_method: model.payment_method.to_string(),
                amount: purchase.total_price,
                status: status.to_string(),
                gateway_id: invoice.id.clone(),
                external_id: request.external_id.clone(),
                payment_url: invoice.invoice_url.clone(),
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(
                    purchase_id,
                    gateway_id = %invoice.id,
                    db_error = ?err,
                    "payments: gateway invoice created but payment row was not stored"
                );
                UseCaseError::Persistence(err)
            })?;

        info!(
            payment_id = payment.id,
            purchase_id,
            gateway_id = %payment.gateway_id,
            "payments: payment created"
        );

        self.audit_trail.record(
            AuditEntry::create(
                Some(user_id),
                AuditEntity::payment(&payment),
                json!({
                    "purchase_id": payment.purchase_id,
                    "payment_method": payment.payment_method,
                    "amount": payment.amount,
                    "status": payment.status,
                    "gateway_id": payment.gateway_id,
                }),
            )
            .with_context(context),
        );

        let job = NotificationJob::new(JobQueue::EmailInvoice, purchase.id, user_id, customer_email);
        if let Err(err) = self.job_publisher.publish(JobQueue::EmailInvoice, job).await {
            error!(purchase_id, queue_error = ?err, "payments: failed to enqueue email_invoice job");
        }

        Ok(payment.into())
    }

    /// Asks the gateway for the live invoice state and reconciles it before answering.
    pub async fn refresh_payment_status(
        &self,
        user_id: i64,
        payment_id: i64,
    ) -> UseCaseResult<PaymentDto> {
        let payment = self
            .payment_repo
            .find_by_id_for_user(payment_id, user_id)
            .await
            .map_err(|err| {
                error!(%user_id, payment_id, db_error = ?err, "payments: failed to load payment");
                UseCaseError::Persistence(err)
            })?
            .ok_or(UseCaseError::NotFound("payment"))?;

        let invoice = self
            .gateway
            .get_invoice(&payment.gateway_id)
            .await
            .map_err(|err| {
                error!(
                    payment_id,
                    gateway_id = %payment.gateway_id,
                    gateway_error = ?err,
                    "payments: failed to fetch gateway invoice"
                );
                UseCaseError::Gateway(err)
            })?;

        let payment = self
            .reconciler
            .apply_gateway_status(payment, &invoice.status, Some(user_id))
            .await?;

        Ok(payment.into())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
