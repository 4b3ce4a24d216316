use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use visa_core::domain::{
    entities::{
        purchases::PurchaseEntity,
        users::UserEntity,
        visas::{VisaEntity, VisaOptionEntity},
    },
    repositories::{
        invoices::{InvoiceArchive, InvoiceRenderer},
        mail::MailSender,
        payments::PaymentRepository,
        purchases::PurchaseRepository,
        users::UserRepository,
        visas::VisaRepository,
    },
    value_objects::{
        enums::job_queues::JobQueue,
        invoices::InvoiceDocument,
        mail::{EmailAttachment, OutgoingEmail},
        notification_jobs::NotificationJob,
    },
};

use super::email_templates;

/// What the consumer should tell the broker about a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Ack,
    Reject { requeue: bool },
}

#[derive(Debug, Error)]
pub enum JobError {
    /// Retrying cannot help; the message is dropped.
    #[error("permanent job failure: {0}")]
    Permanent(String),
    #[error("transient job failure: {0:#}")]
    Transient(#[from] anyhow::Error),
}

impl JobError {
    pub fn outcome(&self) -> JobOutcome {
        match self {
            JobError::Permanent(_) => JobOutcome::Reject { requeue: false },
            JobError::Transient(_) => JobOutcome::Reject { requeue: true },
        }
    }
}

#[async_trait]
pub trait JobProcessor: Send + Sync {
    async fn process(&self, queue: JobQueue, body: &[u8]) -> JobOutcome;
}

/// Records one job needs, loaded fresh for every delivery.
struct JobContext {
    purchase: PurchaseEntity,
    visa: VisaEntity,
    option: Option<VisaOptionEntity>,
    user: UserEntity,
}

pub struct NotificationJobProcessor {
    purchase_repo: Arc<dyn PurchaseRepository + Send + Sync>,
    visa_repo: Arc<dyn VisaRepository + Send + Sync>,
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    payment_repo: Arc<dyn PaymentRepository + Send + Sync>,
    mailer: Arc<dyn MailSender + Send + Sync>,
    renderer: Arc<dyn InvoiceRenderer + Send + Sync>,
    archive: Arc<dyn InvoiceArchive + Send + Sync>,
}

impl NotificationJobProcessor {
    pub fn new(
        purchase_repo: Arc<dyn PurchaseRepository + Send + Sync>,
        visa_repo: Arc<dyn VisaRepository + Send + Sync>,
        user_repo: Arc<dyn UserRepository + Send + Sync>,
        payment_repo: Arc<dyn PaymentRepository + Send + Sync>,
        mailer: Arc<dyn MailSender + Send + Sync>,
        renderer: Arc<dyn InvoiceRenderer + Send + Sync>,
        archive: Arc<dyn InvoiceArchive + Send + Sync>,
    ) -> Self {
        Self {
            purchase_repo,
            visa_repo,
            user_repo,
            payment_repo,
            mailer,
            renderer,
            archive,
        }
    }

    async fn run(&self, queue: JobQueue, job: &NotificationJob) -> Result<(), JobError> {
        if job.job_type != queue.job_type() {
            warn!(
                %queue,
                job_type = %job.job_type,
                purchase_id = job.purchase_id,
                "notification_jobs: job type does not match its queue, routing by queue"
            );
        }

        match queue {
            JobQueue::EmailInvoice => self.send_invoice_email(job).await,
            JobQueue::EmailPaymentSuccess => self.send_payment_success_email(job).await,
            JobQueue::GeneratePdf => Err(JobError::Permanent(format!(
                "{} jobs are not processed",
                queue
            ))),
        }
    }

    async fn send_invoice_email(&self, job: &NotificationJob) -> Result<(), JobError> {
        let context = self.load_context(job).await?;
        let payment = self
            .payment_repo
            .find_latest_by_purchase(context.purchase.id)
            .await
            .context("failed to load payment")?;

        let payment_url = payment
            .as_ref()
            .and_then(|payment| payment.payment_url.as_deref());

        let email = OutgoingEmail {
            to: recipient(job, &context.user),
            subject: email_templates::invoice_subject(&context.visa),
            html_body: email_templates::invoice_body(
                &context.user,
                &context.purchase,
                &context.visa,
                payment_url,
            ),
            attachment: None,
        };

        self.mailer
            .send(email)
            .await
            .context("failed to send invoice email")?;

        Ok(())
    }

    async fn send_payment_success_email(&self, job: &NotificationJob) -> Result<(), JobError> {
        let context = self.load_context(job).await?;
        // A newer pending retry must not replace the settled payment on the invoice.
        let payment = self
            .payment_repo
            .find_latest_paid_by_purchase(context.purchase.id)
            .await
            .context("failed to load paid payment")?
            .ok_or_else(|| {
                anyhow!("no paid payment found for purchase {}", context.purchase.id)
            })?;

        let document = InvoiceDocument::for_purchase(
            &context.purchase,
            &context.visa,
            context.option.as_ref(),
            &context.user,
            &payment,
            Utc::now(),
        )
        .map_err(|err| JobError::Permanent(format!("{:#}", err)))?;

        let pdf = self
            .renderer
            .render(&document)
            .context("failed to render invoice pdf")?;

        let file_name = document.file_name();
        let stored_at = self
            .archive
            .store(&file_name, &pdf)
            .await
            .context("failed to archive invoice pdf")?;

        info!(
            purchase_id = context.purchase.id,
            invoice_number = %document.invoice_number,
            %stored_at,
            "notification_jobs: invoice pdf archived"
        );

        let email = OutgoingEmail {
            to: recipient(job, &context.user),
            subject: email_templates::payment_success_subject(context.purchase.id),
            html_body: email_templates::payment_success_body(&document),
            attachment: Some(EmailAttachment {
                file_name,
                content_type: "application/pdf".to_string(),
                content: pdf,
            }),
        };

        self.mailer
            .send(email)
            .await
            .context("failed to send payment success email")?;

        Ok(())
    }

    /// Any missing record is treated as not yet visible and retried later.
    async fn load_context(&self, job: &NotificationJob) -> Result<JobContext, JobError> {
        let purchase = self
            .purchase_repo
            .find_by_id(job.purchase_id)
            .await
            .context("failed to load purchase")?
            .ok_or_else(|| anyhow!("purchase {} not found", job.purchase_id))?;

        let visa = self
            .visa_repo
            .find_by_id(purchase.visa_id)
            .await
            .context("failed to load visa")?
            .ok_or_else(|| anyhow!("visa {} not found", purchase.visa_id))?;

        let option = match purchase.visa_option_id {
            Some(option_id) => Some(
                self.visa_repo
                    .find_option_by_id(option_id)
                    .await
                    .context("failed to load visa option")?
                    .ok_or_else(|| anyhow!("visa option {} not found", option_id))?,
            ),
            None => None,
        };

        let user = self
            .user_repo
            .find_by_id(job.user_id)
            .await
            .context("failed to load user")?
            .ok_or_else(|| anyhow!("user {} not found", job.user_id))?;

        Ok(JobContext {
            purchase,
            visa,
            option,
            user,
        })
    }
}

#[async_trait]
impl JobProcessor for NotificationJobProcessor {
    async fn process(&self, queue: JobQueue, body: &[u8]) -> JobOutcome {
        let job: NotificationJob = match serde_json::from_slice(body) {
            Ok(job) => job,
            Err(err) => {
                let err = JobError::Permanent(format!("malformed job payload: {}", err));
                error!(%queue, error = %err, "notification_jobs: dropping message");
                return err.outcome();
            }
        };

        match self.run(queue, &job).await {
            Ok(()) => {
                info!(
                    %queue,
                    purchase_id = job.purchase_id,
                    user_id = job.user_id,
                    "notification_jobs: job completed"
                );
                JobOutcome::Ack
            }
            Err(err) => {
                match &err {
                    JobError::Permanent(_) => error!(
                        %queue,
                        purchase_id = job.purchase_id,
                        error = %err,
                        "notification_jobs: dropping message"
                    ),
                    JobError::Transient(_) => warn!(
                        %queue,
                        purchase_id = job.purchase_id,
                        error = %err,
                        "notification_jobs: job failed, will be retried"
                    ),
                }
                err.outcome()
            }
        }
    }
}

fn recipient(job: &NotificationJob, user: &UserEntity) -> String {
    if job.email.trim().is_empty() {
        user.email.clone()
    } else {
        job.email.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visa_core::domain::entities::payments::PaymentEntity;
    use visa_core::domain::repositories::{
        invoices::{MockInvoiceArchive, MockInvoiceRenderer},
        mail::MockMailSender,
        payments::MockPaymentRepository,
        purchases::MockPurchaseRepository,
        users::MockUserRepository,
        visas::MockVisaRepository,
    };

    fn purchase(option_id: Option<i64>) -> PurchaseEntity {
        let now = Utc::now();
        PurchaseEntity {
            id: 42,
            user_id: 3,
            visa_id: 1,
            visa_option_id: option_id,
            total_price: 650_000,
            status: "completed".to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn visa() -> VisaEntity {
        let now = Utc::now();
        VisaEntity {
            id: 1,
            country: "Japan".to_string(),
            visa_type: "Tourist".to_string(),
            price: 500_000,
            duration_days: 90,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn express_option() -> VisaOptionEntity {
        let now = Utc::now();
        VisaOptionEntity {
            id: 5,
            visa_id: 1,
            name: "Express".to_string(),
            price: 150_000,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn customer() -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id: 3,
            email: "rina@viskatera.test".to_string(),
            name: "Rina".to_string(),
            role: "customer".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn paid_payment() -> PaymentEntity {
        let now = Utc::now();
        PaymentEntity {
            id: 7,
            user_id: 3,
            purchase_id: 42,
            payment_method: "qris".to_string(),
            amount: 650_000,
            status: "paid".to_string(),
            gateway_id: "inv_abc".to_string(),
            external_id: "payment_42_1710408600".to_string(),
            payment_url: Some("https://checkout.xendit.co/web/inv_abc".to_string()),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn job_body(queue: JobQueue) -> Vec<u8> {
        serde_json::to_vec(&NotificationJob::new(queue, 42, 3, "rina@viskatera.test")).unwrap()
    }

    struct Mocks {
        purchases: MockPurchaseRepository,
        visas: MockVisaRepository,
        users: MockUserRepository,
        payments: MockPaymentRepository,
        mailer: MockMailSender,
        renderer: MockInvoiceRenderer,
        archive: MockInvoiceArchive,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                purchases: MockPurchaseRepository::new(),
                visas: MockVisaRepository::new(),
                users: MockUserRepository::new(),
                payments: MockPaymentRepository::new(),
                mailer: MockMailSender::new(),
                renderer: MockInvoiceRenderer::new(),
                archive: MockInvoiceArchive::new(),
            }
        }

        /// Purchase 42 for Rina, with or without the Express option.
        fn with_records(mut self, option_id: Option<i64>) -> Self {
            self.purchases
                .expect_find_by_id()
                .returning(move |_| Ok(Some(purchase(option_id))));
            self.visas
                .expect_find_by_id()
                .returning(|_| Ok(Some(visa())));
            self.visas
                .expect_find_option_by_id()
                .returning(|_| Ok(Some(express_option())));
            self.users
                .expect_find_by_id()
                .returning(|_| Ok(Some(customer())));
            self
        }

        fn processor(self) -> NotificationJobProcessor {
            NotificationJobProcessor::new(
                Arc::new(self.purchases),
                Arc::new(self.visas),
                Arc::new(self.users),
                Arc::new(self.payments),
                Arc::new(self.mailer),
                Arc::new(self.renderer),
                Arc::new(self.archive),
            )
        }
    }

    #[tokio::test]
    async fn malformed_payload_is_dropped_without_touching_anything() {
        let processor = Mocks::new().processor();

        let outcome = processor
            .process(JobQueue::EmailInvoice, b"{\"purchase_id\":")
            .await;

        assert_eq!(outcome, JobOutcome::Reject { requeue: false });
    }

    #[tokio::test]
    async fn missing_purchase_is_requeued() {
        let mut mocks = Mocks::new();
        mocks
            .purchases
            .expect_find_by_id()
            .returning(|_| Ok(None));
        mocks.mailer.expect_send().never();

        let outcome = mocks
            .processor()
            .process(JobQueue::EmailInvoice, &job_body(JobQueue::EmailInvoice))
            .await;

        assert_eq!(outcome, JobOutcome::Reject { requeue: true });
    }

    #[tokio::test]
    async fn invoice_email_carries_payment_link() {
        let mut mocks = Mocks::new().with_records(None);
        mocks
            .payments
            .expect_find_latest_by_purchase()
            .returning(|_| Ok(Some(paid_payment())));
        mocks
            .mailer
            .expect_send()
            .withf(|email| {
                email.to == "rina@viskatera.test"
                    && email.subject == "Invoice for Visa Purchase - Japan"
                    && email.html_body.contains("https://checkout.xendit.co/web/inv_abc")
                    && email.attachment.is_none()
            })
            .times(1)
            .returning(|_| Ok(()));

        let outcome = mocks
            .processor()
            .process(JobQueue::EmailInvoice, &job_body(JobQueue::EmailInvoice))
            .await;

        assert_eq!(outcome, JobOutcome::Ack);
    }

    #[tokio::test]
    async fn invoice_email_is_sent_before_any_payment_exists() {
        let mut mocks = Mocks::new().with_records(None);
        mocks
            .payments
            .expect_find_latest_by_purchase()
            .returning(|_| Ok(None));
        mocks
            .mailer
            .expect_send()
            .withf(|email| !email.html_body.contains("<a href"))
            .times(1)
            .returning(|_| Ok(()));

        let outcome = mocks
            .processor()
            .process(JobQueue::EmailInvoice, &job_body(JobQueue::EmailInvoice))
            .await;

        assert_eq!(outcome, JobOutcome::Ack);
    }

    #[tokio::test]
    async fn payment_success_renders_archives_and_attaches_pdf() {
        let mut mocks = Mocks::new().with_records(Some(5));
        mocks
            .payments
            .expect_find_latest_paid_by_purchase()
            .returning(|_| Ok(Some(paid_payment())));
        mocks
            .renderer
            .expect_render()
            .withf(|document| {
                document.purchase_id == 42
                    && document.items.len() == 2
                    && document.total == 650_000
                    && document.payment_status == "paid"
            })
            .times(1)
            .returning(|_| Ok(b"%PDF-1.3 invoice".to_vec()));
        mocks
            .archive
            .expect_store()
            .withf(|file_name, content| {
                file_name.starts_with("invoice_INV-42-")
                    && file_name.ends_with(".pdf")
                    && content == b"%PDF-1.3 invoice"
            })
            .times(1)
            .returning(|file_name, _| Ok(format!("./uploads/invoices/{file_name}")));
        mocks
            .mailer
            .expect_send()
            .withf(|email| {
                let attachment = email.attachment.as_ref();
                email.subject == "Payment Successful - Invoice #42"
                    && attachment.is_some_and(|a| {
                        a.content_type == "application/pdf"
                            && a.file_name.starts_with("invoice_INV-42-")
                            && a.content == b"%PDF-1.3 invoice"
                    })
            })
            .times(1)
            .returning(|_| Ok(()));

        let outcome = mocks
            .processor()
            .process(
                JobQueue::EmailPaymentSuccess,
                &job_body(JobQueue::EmailPaymentSuccess),
            )
            .await;

        assert_eq!(outcome, JobOutcome::Ack);
    }

    #[tokio::test]
    async fn payment_success_without_paid_payment_is_requeued() {
        let mut mocks = Mocks::new().with_records(None);
        mocks
            .payments
            .expect_find_latest_paid_by_purchase()
            .returning(|_| Ok(None));
        mocks.renderer.expect_render().never();
        mocks.mailer.expect_send().never();

        let outcome = mocks
            .processor()
            .process(
                JobQueue::EmailPaymentSuccess,
                &job_body(JobQueue::EmailPaymentSuccess),
            )
            .await;

        assert_eq!(outcome, JobOutcome::Reject { requeue: true });
    }

    #[tokio::test]
    async fn payment_success_invoices_the_settled_payment_not_a_newer_retry() {
        let mut mocks = Mocks::new().with_records(None);
        mocks.payments.expect_find_latest_by_purchase().never();
        mocks
            .payments
            .expect_find_latest_paid_by_purchase()
            .withf(|purchase_id| *purchase_id == 42)
            .times(1)
            .returning(|_| Ok(Some(paid_payment())));
        mocks
            .renderer
            .expect_render()
            .withf(|document| {
                document.payment_status == "paid" && document.payment_method == "qris"
            })
            .times(1)
            .returning(|_| Ok(b"%PDF-1.3 invoice".to_vec()));
        mocks
            .archive
            .expect_store()
            .returning(|file_name, _| Ok(format!("./uploads/invoices/{file_name}")));
        mocks.mailer.expect_send().times(1).returning(|_| Ok(()));

        let outcome = mocks
            .processor()
            .process(
                JobQueue::EmailPaymentSuccess,
                &job_body(JobQueue::EmailPaymentSuccess),
            )
            .await;

        assert_eq!(outcome, JobOutcome::Ack);
    }

    #[tokio::test]
    async fn option_that_does_not_match_the_purchase_is_dropped() {
        let mut mocks = Mocks::new();
        mocks
            .purchases
            .expect_find_by_id()
            .returning(|_| Ok(Some(purchase(Some(5)))));
        mocks
            .visas
            .expect_find_by_id()
            .returning(|_| Ok(Some(visa())));
        mocks
            .visas
            .expect_find_option_by_id()
            .returning(|_| {
                Ok(Some(VisaOptionEntity {
                    id: 6,
                    ..express_option()
                }))
            });
        mocks
            .users
            .expect_find_by_id()
            .returning(|_| Ok(Some(customer())));
        mocks
            .payments
            .expect_find_latest_paid_by_purchase()
            .returning(|_| Ok(Some(paid_payment())));
        mocks.renderer.expect_render().never();
        mocks.mailer.expect_send().never();

        let outcome = mocks
            .processor()
            .process(
                JobQueue::EmailPaymentSuccess,
                &job_body(JobQueue::EmailPaymentSuccess),
            )
            .await;

        assert_eq!(outcome, JobOutcome::Reject { requeue: false });
    }

    #[tokio::test]
    async fn render_failure_is_requeued_and_nothing_is_sent() {
        let mut mocks = Mocks::new().with_records(None);
        mocks
            .payments
            .expect_find_latest_paid_by_purchase()
            .returning(|_| Ok(Some(paid_payment())));
        mocks
            .renderer
            .expect_render()
            .returning(|_| Err(anyhow!("font missing")));
        mocks.archive.expect_store().never();
        mocks.mailer.expect_send().never();

        let outcome = mocks
            .processor()
            .process(
                JobQueue::EmailPaymentSuccess,
                &job_body(JobQueue::EmailPaymentSuccess),
            )
            .await;

        assert_eq!(outcome, JobOutcome::Reject { requeue: true });
    }

    #[tokio::test]
    async fn smtp_failure_is_requeued() {
        let mut mocks = Mocks::new().with_records(None);
        mocks
            .payments
            .expect_find_latest_by_purchase()
            .returning(|_| Ok(None));
        mocks
            .mailer
            .expect_send()
            .returning(|_| Err(anyhow!("connection refused")));

        let outcome = mocks
            .processor()
            .process(JobQueue::EmailInvoice, &job_body(JobQueue::EmailInvoice))
            .await;

        assert_eq!(outcome, JobOutcome::Reject { requeue: true });
    }

    #[tokio::test]
    async fn empty_job_email_falls_back_to_account_email() {
        let mut mocks = Mocks::new().with_records(None);
        mocks
            .payments
            .expect_find_latest_by_purchase()
            .returning(|_| Ok(None));
        mocks
            .mailer
            .expect_send()
            .withf(|email| email.to == "rina@viskatera.test")
            .times(1)
            .returning(|_| Ok(()));

        let body =
            serde_json::to_vec(&NotificationJob::new(JobQueue::EmailInvoice, 42, 3, "")).unwrap();
        let outcome = mocks
            .processor()
            .process(JobQueue::EmailInvoice, &body)
            .await;

        assert_eq!(outcome, JobOutcome::Ack);
    }

    #[test]
    fn job_errors_map_to_reject_flags() {
        assert_eq!(
            JobError::Permanent("bad".to_string()).outcome(),
            JobOutcome::Reject { requeue: false }
        );
        assert_eq!(
            JobError::Transient(anyhow!("later")).outcome(),
            JobOutcome::Reject { requeue: true }
        );
    }
}
