use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use visa_core::{
    domain::{repositories::audit_trail::AuditTrail, value_objects::payments::CreatePaymentModel},
    infra::{
        db::{
            postgres::postgres_connection::PgPoolSquad,
            repositories::{
                payments::PaymentPostgres, purchases::PurchasePostgres, users::UserPostgres,
                visas::VisaPostgres,
            },
        },
        queue::rabbitmq_publisher::RabbitMqPublisher,
    },
    payments::xendit_client::XenditClient,
};

use crate::{
    auth::AuthUser,
    axum_http::{
        api_response::ApiResponse, error_responses::AppError, request_context::request_context,
    },
    usecases::payments::PaymentUseCase,
};

type PaymentUseCaseImpl = PaymentUseCase<
    PaymentPostgres,
    PurchasePostgres,
    VisaPostgres,
    UserPostgres,
    RabbitMqPublisher,
    XenditClient,
>;

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    job_publisher: Arc<RabbitMqPublisher>,
    audit_trail: Arc<dyn AuditTrail>,
    xendit_client: Arc<XenditClient>,
) -> Router {
    let payments_usecase = PaymentUseCase::new(
        Arc::new(PaymentPostgres::new(Arc::clone(&db_pool))),
        Arc::new(PurchasePostgres::new(Arc::clone(&db_pool))),
        Arc::new(VisaPostgres::new(Arc::clone(&db_pool))),
        Arc::new(UserPostgres::new(Arc::clone(&db_pool))),
        job_publisher,
        xendit_client,
        audit_trail,
    );

    Router::new()
        .route("/", post(create_payment))
        .route("/:id/status", get(payment_status))
        .with_state(Arc::new(payments_usecase))
}

pub async fn create_payment(
    State(payments_usecase): State<Arc<PaymentUseCaseImpl>>,
    auth: AuthUser,
    headers: HeaderMap,
    payload: Result<Json<CreatePaymentModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(model) = payload?;

    let payment = payments_usecase
        .create_payment(auth.user_id, model, request_context(&headers))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Payment created successfully", payment)),
    ))
}

pub async fn payment_status(
    State(payments_usecase): State<Arc<PaymentUseCaseImpl>>,
    auth: AuthUser,
    payment_id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(payment_id) = payment_id?;

    let payment = payments_usecase
        .refresh_payment_status(auth.user_id, payment_id)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success("Payment status retrieved", payment)),
    ))
}
