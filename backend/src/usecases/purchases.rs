use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};
use visa_core::domain::{
    entities::purchases::InsertPurchaseEntity,
    repositories::{
        audit_trail::AuditTrail, purchases::PurchaseRepository, users::UserRepository,
        visas::VisaRepository,
    },
    value_objects::{
        audit::{AuditEntity, AuditEntry, RequestContext},
        enums::purchase_statuses::PurchaseStatus,
        pagination::{Pagination, PaginationMeta, PaginationQuery},
        purchases::{CreatePurchaseModel, PurchaseDto, UpdatePurchaseStatusModel},
    },
};

use super::{
    access::ensure_admin,
    errors::{UseCaseError, UseCaseResult},
};

pub const DEFAULT_PURCHASES_PER_PAGE: i64 = 10;

pub struct PurchaseUseCase<Pur, V, U>
where
    Pur: PurchaseRepository + Send + Sync + 'static,
    V: VisaRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    purchase_repo: Arc<Pur>,
    visa_repo: Arc<V>,
    user_repo: Arc<U>,
    audit_trail: Arc<dyn AuditTrail>,
}

impl<Pur, V, U> PurchaseUseCase<Pur, V, U>
where
    Pur: PurchaseRepository + Send + Sync + 'static,
    V: VisaRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(
        purchase_repo: Arc<Pur>,
        visa_repo: Arc<V>,
        user_repo: Arc<U>,
        audit_trail: Arc<dyn AuditTrail>,
    ) -> Self {
        Self {
            purchase_repo,
            visa_repo,
            user_repo,
            audit_trail,
        }
    }

    pub async fn create_purchase(
        &self,
        user_id: i64,
        model: CreatePurchaseModel,
        context: RequestContext,
    ) -> UseCaseResult<PurchaseDto> {
        let visa_id = model.visa_id;

        let visa = self
            .visa_repo
            .find_active_by_id(visa_id)
            .await
            .map_err(|err| {
                error!(visa_id, db_error = ?err, "purchases: failed to load visa");
                UseCaseError::Persistence(err)
            })?
            .ok_or(UseCaseError::NotFound("visa"))?;

        let option_price = match model.visa_option_id {
            Some(option_id) => {
                self.visa_repo
                    .find_active_option(option_id, visa.id)
                    .await
                    .map_err(|err| {
                        error!(visa_id, option_id, db_error = ?err, "purchases: failed to load visa option");
                        UseCaseError::Persistence(err)
                    })?
                    .ok_or(UseCaseError::NotFound("visa option"))?
                    .price
            }
            None => 0,
        };

        let now = Utc::now();
        let purchase = self
            .purchase_repo
            .create(InsertPurchaseEntity {
                user_id,
                visa_id: visa.id,
                visa_option_id: model.visa_option_id,
                total_price: visa.price + option_price,
                status: PurchaseStatus::Pending.to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(%user_id, visa_id, db_error = ?err, "purchases: failed to create purchase");
                UseCaseError::Persistence(err)
            })?;

        info!(
            purchase_id = purchase.id,
            %user_id,
            total_price = purchase.total_price,
            "purchases: purchase created"
        );

        self.audit_trail.record(
            AuditEntry::create(
                Some(user_id),
                AuditEntity::purchase(&purchase),
                json!({
                    "visa_id": purchase.visa_id,
                    "visa_option_id": purchase.visa_option_id,
                    "total_price": purchase.total_price,
                    "status": purchase.status,
                }),
            )
            .with_context(context),
        );

        Ok(purchase.into())
    }

    pub async fn list_purchases(
        &self,
        user_id: i64,
        query: PaginationQuery,
    ) -> UseCaseResult<(Vec<PurchaseDto>, PaginationMeta)> {
        let pagination = Pagination::from_query(&query, DEFAULT_PURCHASES_PER_PAGE);

        let (purchases, total) = self
            .purchase_repo
            .list_for_user(user_id, pagination)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "purchases: failed to list purchases");
                UseCaseError::Persistence(err)
            })?;

        Ok((
            purchases.into_iter().map(PurchaseDto::from).collect(),
            pagination.meta(total),
        ))
    }

    pub async fn get_purchase(&self, user_id: i64, purchase_id: i64) -> UseCaseResult<PurchaseDto> {
        self.purchase_repo
            .find_by_id_for_user(purchase_id, user_id)
            .await
            .map_err(|err| {
                error!(%user_id, purchase_id, db_error = ?err, "purchases: failed to load purchase");
                UseCaseError::Persistence(err)
            })?
            .map(PurchaseDto::from)
            .ok_or(UseCaseError::NotFound("purchase"))
    }

    /// Admin-only. Setting the current status again succeeds without writing anything.
    pub async fn update_purchase_status(
        &self,
        admin_id: i64,
        purchase_id: i64,
        model: UpdatePurchaseStatusModel,
        context: RequestContext,
    ) -> UseCaseResult<PurchaseDto> {
        ensure_admin(self.user_repo.as_ref(), admin_id).await?;

        let next = PurchaseStatus::from_str(model.status.trim()).ok_or_else(|| {
            UseCaseError::Validation(format!(
                "status must be one of pending, completed, cancelled (got {})",
                model.status
            ))
        })?;

        let purchase = self
            .purchase_repo
            .find_by_id(purchase_id)
            .await
            .map_err(|err| {
                error!(purchase_id, db_error = ?err, "purchases: failed to load purchase");
                UseCaseError::Persistence(err)
            })?
            .ok_or(UseCaseError::NotFound("purchase"))?;

        if purchase.status == next.as_str() {
            return Ok(purchase.into());
        }

        let current = PurchaseStatus::from_str(&purchase.status);
        if !current.is_some_and(|current| current.can_transition_to(next)) {
            warn!(purchase_id, from = %purchase.status, to = %next, "purchases: rejected status transition");
            return Err(UseCaseError::Validation(format!(
                "purchase cannot move from {} to {}",
                purchase.status, next
            )));
        }

        let changed = self
            .purchase_repo
            .update_status_if(purchase_id, &purchase.status, next.as_str())
            .await
            .map_err(|err| {
                error!(purchase_id, db_error = ?err, "purchases: failed to update status");
                UseCaseError::Persistence(err)
            })?;

        if !changed {
            return Err(UseCaseError::Validation(
                "purchase status changed concurrently, reload and retry".to_string(),
            ));
        }

        info!(purchase_id, %admin_id, from = %purchase.status, to = %next, "purchases: status updated");

        self.audit_trail.record(
            AuditEntry::update(
                Some(admin_id),
                AuditEntity::purchase(&purchase),
                json!({ "status": purchase.status }),
                json!({ "status": next.as_str() }),
            )
            .with_context(context),
        );

        let mut dto = PurchaseDto::from(purchase);
        dto.status = next.to_string();
        dto.updated_at = Utc::now();
        Ok(dto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::payment_reconciliation::tests::{
        InMemoryPurchases, RecordingAudit, purchase,
    };
    use mockall::predicate::eq;
    use visa_core::domain::{
        entities::{
            users::UserEntity,
            visas::{VisaEntity, VisaOptionEntity},
        },
        repositories::{
            audit_trail::MockAuditTrail, purchases::MockPurchaseRepository,
            users::MockUserRepository, visas::MockVisaRepository,
        },
    };

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

    fn admin_repo(role: &'static str) -> MockUserRepository {
        let mut user_repo = MockUserRepository::new();
        user_repo.expect_find_by_id().returning(move |id| {
            let now = Utc::now();
            Ok(Some(UserEntity {
                id,
                email: "ops@viskatera.test".to_string(),
                name: "Ops".to_string(),
                role: role.to_string(),
                is_active: true,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            }))
        });
        user_repo
    }

    #[tokio::test]
    async fn create_purchase_totals_visa_and_option() {
        let mut visa_repo = MockVisaRepository::new();
        visa_repo
            .expect_find_active_by_id()
            .with(eq(1))
            .returning(|_| Ok(Some(visa())));
        visa_repo
            .expect_find_active_option()
            .with(eq(5), eq(1))
            .returning(|_, _| Ok(Some(express_option())));

        let purchases = Arc::new(InMemoryPurchases::default());
        let audit = Arc::new(RecordingAudit::default());
        let usecase = PurchaseUseCase::new(
            Arc::clone(&purchases),
            Arc::new(visa_repo),
            Arc::new(MockUserRepository::new()),
            Arc::clone(&audit) as Arc<dyn AuditTrail>,
        );

        let dto = usecase
            .create_purchase(
                3,
                CreatePurchaseModel {
                    visa_id: 1,
                    visa_option_id: Some(5),
                },
                RequestContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(dto.total_price, 650_000);
        assert_eq!(dto.status, "pending");
        assert_eq!(dto.user_id, 3);
        assert_eq!(audit.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn option_from_another_visa_is_not_found() {
        let mut visa_repo = MockVisaRepository::new();
        visa_repo
            .expect_find_active_by_id()
            .returning(|_| Ok(Some(visa())));
        visa_repo
            .expect_find_active_option()
            .returning(|_, _| Ok(None));

        let mut purchase_repo = MockPurchaseRepository::new();
        purchase_repo.expect_create().never();

        let usecase = PurchaseUseCase::new(
            Arc::new(purchase_repo),
            Arc::new(visa_repo),
            Arc::new(MockUserRepository::new()),
            Arc::new(MockAuditTrail::new()) as Arc<dyn AuditTrail>,
        );

        let err = usecase
            .create_purchase(
                3,
                CreatePurchaseModel {
                    visa_id: 1,
                    visa_option_id: Some(77),
                },
                RequestContext::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UseCaseError::NotFound("visa option")));
    }

    #[tokio::test]
    async fn list_applies_default_page_size() {
        let mut purchase_repo = MockPurchaseRepository::new();
        purchase_repo
            .expect_list_for_user()
            .with(eq(3), eq(Pagination { page: 2, per_page: 10 }))
            .returning(|_, _| Ok((vec![purchase(42, "pending")], 11)));

        let usecase = PurchaseUseCase::new(
            Arc::new(purchase_repo),
            Arc::new(MockVisaRepository::new()),
            Arc::new(MockUserRepository::new()),
            Arc::new(MockAuditTrail::new()) as Arc<dyn AuditTrail>,
        );

        let (items, meta) = usecase
            .list_purchases(
                3,
                PaginationQuery {
                    page: Some(2),
                    per_page: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(meta.total_pages, 2);
    }

    #[tokio::test]
    async fn admin_completes_pending_purchase() {
        let purchases = Arc::new(InMemoryPurchases::with(purchase(42, "pending")));
        let audit = Arc::new(RecordingAudit::default());
        let usecase = PurchaseUseCase::new(
            Arc::clone(&purchases),
            Arc::new(MockVisaRepository::new()),
            Arc::new(admin_repo("admin")),
            Arc::clone(&audit) as Arc<dyn AuditTrail>,
        );

        let dto = usecase
            .update_purchase_status(
                1,
                42,
                UpdatePurchaseStatusModel {
                    status: "completed".to_string(),
                },
                RequestContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(dto.status, "completed");
        assert_eq!(purchases.status(42), "completed");
        let entries = audit.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].old_values, Some(json!({"status": "pending"})));
    }

    #[tokio::test]
    async fn same_status_is_a_silent_no_op() {
        let purchases = Arc::new(InMemoryPurchases::with(purchase(42, "completed")));
        let audit = Arc::new(RecordingAudit::default());
        let usecase = PurchaseUseCase::new(
            Arc::clone(&purchases),
            Arc::new(MockVisaRepository::new()),
            Arc::new(admin_repo("admin")),
            Arc::clone(&audit) as Arc<dyn AuditTrail>,
        );

        let dto = usecase
            .update_purchase_status(
                1,
                42,
                UpdatePurchaseStatusModel {
                    status: "completed".to_string(),
                },
                RequestContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(dto.status, "completed");
        assert!(audit.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reopening_is_rejected() {
        let purchases = Arc::new(InMemoryPurchases::with(purchase(42, "cancelled")));
        let usecase = PurchaseUseCase::new(
            Arc::clone(&purchases),
            Arc::new(MockVisaRepository::new()),
            Arc::new(admin_repo("admin")),
            Arc::new(RecordingAudit::default()) as Arc<dyn AuditTrail>,
        );

        for status in ["pending", "completed", "refunded"] {
            let err = usecase
                .update_purchase_status(
                    1,
                    42,
                    UpdatePurchaseStatusModel {
                        status: status.to_string(),
                    },
                    RequestContext::default(),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, UseCaseError::Validation(_)));
        }
        assert_eq!(purchases.status(42), "cancelled");
    }

    #[tokio::test]
    async fn customers_cannot_change_status() {
        let mut purchase_repo = MockPurchaseRepository::new();
        purchase_repo.expect_find_by_id().never();

        let usecase = PurchaseUseCase::new(
            Arc::new(purchase_repo),
            Arc::new(MockVisaRepository::new()),
            Arc::new(admin_repo("customer")),
            Arc::new(MockAuditTrail::new()) as Arc<dyn AuditTrail>,
        );

        let err = usecase
            .update_purchase_status(
                3,
                42,
                UpdatePurchaseStatusModel {
                    status: "completed".to_string(),
                },
                RequestContext::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UseCaseError::Forbidden(_)));
    }
}
