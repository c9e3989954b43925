use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use relay_core::{CoreError, ValidationError};
use relay_storage::StorageError;

/// Errors surfaced across the publisher-facing HTTP surface. Each variant
/// carries the stable `code` string the spec's external-interfaces section
/// requires (§6).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("delivery error: {0}")]
    Delivery(#[from] relay_delivery::DeliveryError),

    #[error("no-auth-on-callback-url: callback url accepted an unauthenticated request")]
    NoAuthOnCallbackUrl,

    #[error("invalid-callback-url: {0}")]
    InvalidCallbackUrl(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Validation(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Validation(v) => (StatusCode::BAD_REQUEST, v.code, v.message.clone()),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, "not_found", format!("{what} not found")),
            ApiError::Storage(StorageError::NotFound) => {
                (StatusCode::NOT_FOUND, "not_found", self.to_string())
            }
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", self.to_string()),
            ApiError::Delivery(_) => (StatusCode::INTERNAL_SERVER_ERROR, "delivery_error", self.to_string()),
            ApiError::NoAuthOnCallbackUrl => {
                (StatusCode::BAD_REQUEST, "no-auth-on-callback-url", self.to_string())
            }
            ApiError::InvalidCallbackUrl(_) => {
                (StatusCode::BAD_REQUEST, "invalid-callback-url", self.to_string())
            }
        };

        let body = json!({
            "code": code,
            "title": message,
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}
