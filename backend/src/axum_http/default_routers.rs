use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use super::api_response::ApiResponse;

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error("NOT_FOUND", "Route not found", None)),
    )
}

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse::success("OK", json!({ "status": "ok" }))),
    )
}
