use std::sync::Arc;

use tracing::error;
use visa_core::domain::{
    repositories::visas::VisaRepository,
    value_objects::{
        pagination::{Pagination, PaginationMeta},
        visas::{VisaDetailDto, VisaDto, VisaListQuery, VisaOptionDto},
    },
};

use super::errors::{UseCaseError, UseCaseResult};

pub const DEFAULT_VISAS_PER_PAGE: i64 = 10;

/// Read-only view of the catalog; inactive visas and options are never shown.
pub struct VisaUseCase<V>
where
    V: VisaRepository + Send + Sync + 'static,
{
    visa_repo: Arc<V>,
}

impl<V> VisaUseCase<V>
where
    V: VisaRepository + Send + Sync + 'static,
{
    pub fn new(visa_repo: Arc<V>) -> Self {
        Self { visa_repo }
    }

    pub async fn list_visas(
        &self,
        query: VisaListQuery,
    ) -> UseCaseResult<(Vec<VisaDto>, PaginationMeta)> {
        let pagination = Pagination::from_query(&query.pagination(), DEFAULT_VISAS_PER_PAGE);

        let (visas, total) = self
            .visa_repo
            .list_active(query.filter(), pagination)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "visas: failed to list visas");
                UseCaseError::Persistence(err)
            })?;

        Ok((
            visas.into_iter().map(VisaDto::from).collect(),
            pagination.meta(total),
        ))
    }

    pub async fn get_visa(&self, visa_id: i64) -> UseCaseResult<VisaDetailDto> {
        let visa = self
            .visa_repo
            .find_active_by_id(visa_id)
            .await
            .map_err(|err| {
                error!(visa_id, db_error = ?err, "visas: failed to load visa");
                UseCaseError::Persistence(err)
            })?
            .ok_or(UseCaseError::NotFound("visa"))?;

        let options = self
            .visa_repo
            .list_active_options(visa.id)
            .await
            .map_err(|err| {
                error!(visa_id, db_error = ?err, "visas: failed to load visa options");
                UseCaseError::Persistence(err)
            })?;

        Ok(VisaDetailDto {
            visa: visa.into(),
            options: options.into_iter().map(VisaOptionDto::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::Utc;
    use mockall::predicate::eq;
    use visa_core::domain::{
        entities::visas::{VisaEntity, VisaOptionEntity},
        repositories::visas::MockVisaRepository,
        value_objects::visas::VisaFilter,
    };

    fn visa(id: i64, country: &str) -> VisaEntity {
        let now = Utc::now();
        VisaEntity {
            id,
            country: country.to_string(),
            visa_type: "Tourist".to_string(),
            price: 500_000,
            duration_days: 90,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn option(id: i64, name: &str, price: i64) -> VisaOptionEntity {
        let now = Utc::now();
        VisaOptionEntity {
            id,
            visa_id: 1,
            name: name.to_string(),
            price,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn list_passes_trimmed_filters_and_default_page_size() {
        let mut visa_repo = MockVisaRepository::new();
        visa_repo
            .expect_list_active()
            .with(
                eq(VisaFilter {
                    country: Some("jap".to_string()),
                    visa_type: None,
                }),
                eq(Pagination { page: 1, per_page: 10 }),
            )
            .times(1)
            .returning(|_, _| Ok((vec![visa(1, "Japan")], 1)));

        let usecase = VisaUseCase::new(Arc::new(visa_repo));
        let (items, meta) = usecase
            .list_visas(VisaListQuery {
                country: Some(" jap ".to_string()),
                visa_type: Some("".to_string()),
                page: None,
                per_page: Some(1000),
            })
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].country, "Japan");
        assert_eq!(meta.total, 1);
        assert_eq!(meta.total_pages, 1);
    }

    #[tokio::test]
    async fn detail_carries_active_options() {
        let mut visa_repo = MockVisaRepository::new();
        visa_repo
            .expect_find_active_by_id()
            .with(eq(1))
            .returning(|_| Ok(Some(visa(1, "Japan"))));
        visa_repo
            .expect_list_active_options()
            .with(eq(1))
            .returning(|_| {
                Ok(vec![
                    option(4, "Standard", 0),
                    option(5, "Express", 150_000),
                ])
            });

        let usecase = VisaUseCase::new(Arc::new(visa_repo));
        let detail = usecase.get_visa(1).await.unwrap();

        assert_eq!(detail.visa.id, 1);
        let ids: Vec<i64> = detail.options.iter().map(|option| option.id).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[tokio::test]
    async fn inactive_or_missing_visa_is_not_found() {
        let mut visa_repo = MockVisaRepository::new();
        visa_repo.expect_find_active_by_id().returning(|_| Ok(None));
        visa_repo.expect_list_active_options().never();

        let usecase = VisaUseCase::new(Arc::new(visa_repo));
        let err = usecase.get_visa(99).await.unwrap_err();

        assert!(matches!(err, UseCaseError::NotFound("visa")));
    }

    #[tokio::test]
    async fn database_failure_is_a_persistence_error() {
        let mut visa_repo = MockVisaRepository::new();
        visa_repo
            .expect_list_active()
            .returning(|_, _| Err(anyhow!("connection refused")));

        let usecase = VisaUseCase::new(Arc::new(visa_repo));
        let err = usecase
            .list_visas(VisaListQuery::default())
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Persistence(_)));
    }
}
