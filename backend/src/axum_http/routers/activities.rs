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
    domain::{
        repositories::{activity_logs::ActivityLogRepository, users::UserRepository},
        value_objects::{activities::ActivityLogQuery, pagination::PaginationQuery},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{activity_logs::ActivityLogPostgres, users::UserPostgres},
    },
};

use crate::{
    auth::AuthUser,
    axum_http::{api_response::ApiResponse, error_responses::AppError},
    usecases::activities::ActivityUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let activities_usecase = ActivityUseCase::new(
        Arc::new(ActivityLogPostgres::new(Arc::clone(&db_pool))),
        Arc::new(UserPostgres::new(Arc::clone(&db_pool))),
    );

    Router::new()
        .route("/", get(list_activities))
        .route("/:entity_type/:entity_id", get(list_entity_activities))
        .with_state(Arc::new(activities_usecase))
}

pub async fn list_activities<A, U>(
    State(activities_usecase): State<Arc<ActivityUseCase<A, U>>>,
    auth: AuthUser,
    query: Result<Query<ActivityLogQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError>
where
    A: ActivityLogRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let Query(query) = query?;

    let (activities, meta) = activities_usecase
        .list_activities(auth.user_id, query)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::paginated(
            "Activity logs retrieved successfully",
            activities,
            meta,
        )),
    ))
}

pub async fn list_entity_activities<A, U>(
    State(activities_usecase): State<Arc<ActivityUseCase<A, U>>>,
    auth: AuthUser,
    path: Result<Path<(String, i64)>, PathRejection>,
    query: Result<Query<PaginationQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError>
where
    A: ActivityLogRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
{
    let Path((entity_type, entity_id)) = path?;
    let Query(query) = query?;

    let (activities, meta) = activities_usecase
        .list_entity_activities(auth.user_id, &entity_type, entity_id, query)
        .await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::paginated(
            "Entity activity logs retrieved successfully",
            activities,
            meta,
        )),
    ))
}
