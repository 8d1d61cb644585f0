use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use trade_journal_core::{StoreError, ValidationError};

/// API-layer error type
#[derive(Debug)]
pub enum ApiError {
    /// 400 - Submitted trade failed validation
    BadRequest(String),

    /// 401 - No identity could be established
    Unauthorized,

    /// 404 - Unknown trade id
    NotFound(String),

    /// 405 - The configured store cannot perform this operation
    NotSupported(String),

    /// 500 - Storage or rendering failure
    Internal(String),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "sign in required".to_string(),
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Self::NotSupported(msg) => (StatusCode::METHOD_NOT_ALLOWED, "not_supported", msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_type.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::NotFound(err.to_string()),
            StoreError::Unsupported(_) => Self::NotSupported(err.to_string()),
            other => {
                tracing::error!(error = %other, "Store operation failed");
                Self::Internal(other.to_string())
            }
        }
    }
}
