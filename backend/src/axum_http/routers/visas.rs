use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use visa_core::{
    domain::{repositories::visas::VisaRepository, value_objects::visas::VisaListQuery},
    infra::db::{postgres::postgres_connection::PgPoolSquad, repositories::visas::VisaPostgres},
};

use crate::{
    axum_http::{api_response::ApiResponse, error_responses::AppError},
    usecases::visas::VisaUseCase,
};

/// Public catalog; no bearer token is required.
pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let visas_usecase = VisaUseCase::new(Arc::new(VisaPostgres::new(db_pool)));

    router(Arc::new(visas_usecase))
}

pub fn router<V>(visas_usecase: Arc<VisaUseCase<V>>) -> Router
where
    V: VisaRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_visas))
        .route("/:id", get(get_visa))
        .with_state(visas_usecase)
}

pub async fn list_visas<V>(
    State(visas_usecase): State<Arc<VisaUseCase<V>>>,
    query: Result<Query<VisaListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError>
where
    V: VisaRepository + Send + Sync + 'static,
{
    let Query(query) = query?;

    let (visas, meta) = visas_usecase.list_visas(query).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::paginated(
            "Visas retrieved successfully",
            visas,
            meta,
        )),
    ))
}

pub async fn get_visa<V>(
    State(visas_usecase): State<Arc<VisaUseCase<V>>>,
    visa_id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError>
where
    V: VisaRepository + Send + Sync + 'static,
{
    let Path(visa_id) = visa_id?;

    let visa = visas_usecase.get_visa(visa_id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success("Visa retrieved successfully", visa)),
    ))
}
