use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use super::api_response::ApiResponse;
use crate::usecases::errors::UseCaseError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(&'static str),

    #[error(transparent)]
    UseCase(#[from] UseCaseError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::UseCase(err) => err.status_code(),
        }
    }

    pub fn envelope(&self) -> ApiResponse<()> {
        match self {
            AppError::Unauthorized(message) => ApiResponse::error("UNAUTHORIZED", *message, None),
            AppError::UseCase(err) => {
                if err.status_code().is_server_error() {
                    error!(error = ?err, "request failed");
                }
                ApiResponse::error(err.code(), err.public_message(), None)
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::UseCase(UseCaseError::Validation(rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::UseCase(UseCaseError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::UseCase(UseCaseError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.envelope())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_errors_are_masked() {
        let err = AppError::from(UseCaseError::Persistence(anyhow::anyhow!(
            "could not connect to server: Connection refused"
        )));
        let envelope = err.envelope();

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(envelope.message, "Internal server error");
        assert_eq!(envelope.error.unwrap().code, "DATABASE_ERROR");
    }
}
