use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get,
};
use visa_core::{
    domain::repositories::{job_queue::JobPublisher, users::UserRepository},
    infra::{
        db::{postgres::postgres_connection::PgPoolSquad, repositories::users::UserPostgres},
        queue::rabbitmq_publisher::RabbitMqPublisher,
    },
};

use crate::{
    auth::AuthUser,
    axum_http::{api_response::ApiResponse, error_responses::AppError},
    usecases::monitoring::MonitoringUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>, job_publisher: Arc<RabbitMqPublisher>) -> Router {
    let monitoring_usecase = MonitoringUseCase::new(
        job_publisher,
        Arc::new(UserPostgres::new(Arc::clone(&db_pool))),
    );

    Router::new()
        .route("/queues", get(queue_stats))
        .route("/queues/health", get(queue_health))
        .with_state(Arc::new(monitoring_usecase))
}

pub async fn queue_stats<Q, U>(
    State(monitoring_usecase): State<Arc<MonitoringUseCase<Q, U>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    Q: JobPublisher + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let stats = monitoring_usecase.queue_stats(auth.user_id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success("Queue statistics retrieved", stats)),
    ))
}

pub async fn queue_health<Q, U>(
    State(monitoring_usecase): State<Arc<MonitoringUseCase<Q, U>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    Q: JobPublisher + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let health = monitoring_usecase.queue_health(auth.user_id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success("Queue health retrieved", health)),
    ))
}
