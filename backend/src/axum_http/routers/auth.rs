use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use visa_core::{
    domain::{repositories::users::UserRepository, value_objects::auth::LoginModel},
    infra::db::{postgres::postgres_connection::PgPoolSquad, repositories::users::UserPostgres},
};

use crate::{
    axum_http::{api_response::ApiResponse, error_responses::AppError},
    usecases::auth::AuthUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>, jwt_secret: String) -> Router {
    let auth_usecase = AuthUseCase::new(Arc::new(UserPostgres::new(db_pool)), jwt_secret);

    Router::new()
        .route("/", post(login))
        .with_state(Arc::new(auth_usecase))
}

pub async fn login<U>(
    State(auth_usecase): State<Arc<AuthUseCase<U>>>,
    payload: Result<Json<LoginModel>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
{
    let Json(model) = payload?;

    let session = auth_usecase.login(model).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success("Login successful", session)),
    ))
}
