use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, put},
};
use visa_core::{
    domain::{
        repositories::{
            audit_trail::AuditTrail, purchases::PurchaseRepository, users::UserRepository,
            visas::VisaRepository,
        },
        value_objects::{
            pagination::PaginationQuery,
            purchases::{CreatePurchaseModel, UpdatePurchaseStatusModel},
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{purchases::PurchasePostgres, users::UserPostgres, visas::VisaPostgres},
    },
};

use crate::{
    auth::AuthUser,
    axum_http::{
        api_response::ApiResponse, error_responses::AppError, request_context::request_context,
    },
    usecases::purchases::PurchaseUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>, audit_trail: Arc<dyn AuditTrail>) -> Router {
    let purchases_usecase = PurchaseUseCase::new(
        Arc::new(PurchasePostgres::new(Arc::clone(&db_pool))),
        Arc::new(VisaPostgres::new(Arc::clone(&db_pool))),
        Arc::new(UserPostgres::new(Arc::clone(&db_pool))),
        audit_trail,
    );

    Router::new()
        .route("/", get(list_purchases).post(create_purchase))
        .route("/:id", get(get_purchase))
        .route("/:id/status", put(update_purchase_status))
        .with_state(Arc::new(purchases_usecase))
}

pub async fn create_purchase<Pur, V, U>(
    State(purchases_usecase): State<Arc<PurchaseUseCase<Pur, V, U>>>,
    auth: AuthUser,
    headers: HeaderMap,
    payload: Result<Json<CreatePurchaseModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    Pur: PurchaseRepository + Send + Sync + 'static,
    V: VisaRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let Json(model) = payload?;

    let purchase = purchases_usecase
        .create_purchase(auth.user_id, model, request_context(&headers))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Purchase created successfully", purchase)),
    ))
}

pub async fn list_purchases<Pur, V, U>(
    State(purchases_usecase): State<Arc<PurchaseUseCase<Pur, V, U>>>,
    auth: AuthUser,
    query: Result<Query<PaginationQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError>
where
    Pur: PurchaseRepository + Send + Sync + 'static,
    V: VisaRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let Query(query) = query?;

    let (purchases, meta) = purchases_usecase
        .list_purchases(auth.user_id, query)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::paginated(
            "Purchases retrieved successfully",
            purchases,
            meta,
        )),
    ))
}

pub async fn get_purchase<Pur, V, U>(
    State(purchases_usecase): State<Arc<PurchaseUseCase<Pur, V, U>>>,
    auth: AuthUser,
    purchase_id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError>
where
    Pur: PurchaseRepository + Send + Sync + 'static,
    V: VisaRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let Path(purchase_id) = purchase_id?;

    let purchase = purchases_usecase
        .get_purchase(auth.user_id, purchase_id)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success("Purchase retrieved successfully", purchase)),
    ))
}

pub async fn update_purchase_status<Pur, V, U>(
    State(purchases_usecase): State<Arc<PurchaseUseCase<Pur, V, U>>>,
    auth: AuthUser,
    headers: HeaderMap,
    purchase_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdatePurchaseStatusModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    Pur: PurchaseRepository + Send + Sync + 'static,
    V: VisaRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let Path(purchase_id) = purchase_id?;
    let Json(model) = payload?;

    let purchase = purchases_usecase
        .update_purchase_status(auth.user_id, purchase_id, model, request_context(&headers))
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success("Purchase status updated", purchase)),
    ))
}
