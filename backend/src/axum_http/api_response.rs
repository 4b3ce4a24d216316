use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use visa_core::domain::value_objects::pagination::PaginationMeta;

/// Envelope shared by every JSON response of the API.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PaginationMeta>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
            meta: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn paginated(message: impl Into<String>, data: T, meta: PaginationMeta) -> Self {
        Self {
            meta: Some(meta),
            ..Self::success(message, data)
        }
    }
}

impl ApiResponse<()> {
    pub fn error(code: &str, message: impl Into<String>, details: Option<Value>) -> Self {
        let message = message.into();
        Self {
            success: false,
            message: message.clone(),
            data: None,
            error: Some(ApiErrorBody {
                code: code.to_string(),
                message,
                details,
            }),
            meta: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
