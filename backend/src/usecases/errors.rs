use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("payment gateway error: {0}")]
    Gateway(#[source] anyhow::Error),
    #[error("{0}")]
    Unavailable(String),
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}

impl UseCaseError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UseCaseError::Validation(_) => StatusCode::BAD_REQUEST,
            UseCaseError::NotFound(_) => StatusCode::NOT_FOUND,
            UseCaseError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            UseCaseError::Forbidden(_) => StatusCode::FORBIDDEN,
            UseCaseError::Gateway(_) => StatusCode::BAD_GATEWAY,
            UseCaseError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            UseCaseError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine readable code placed in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            UseCaseError::Validation(_) => "VALIDATION_ERROR",
            UseCaseError::NotFound(_) => "NOT_FOUND",
            UseCaseError::Unauthorized(_) => "UNAUTHORIZED",
            UseCaseError::Forbidden(_) => "ACCESS_DENIED",
            UseCaseError::Gateway(_) => "GATEWAY_ERROR",
            UseCaseError::Unavailable(_) => "SERVICE_UNAVAILABLE",
            UseCaseError::Persistence(_) => "DATABASE_ERROR",
        }
    }

    /// Upstream and driver errors stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            UseCaseError::Gateway(_) => "Payment gateway is unavailable, please retry".to_string(),
            UseCaseError::Persistence(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, UseCaseError>;
