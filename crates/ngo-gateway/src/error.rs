use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ngo_core::InventoryError;
use serde_json::json;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Maps domain failures onto HTTP responses with a `{success, message}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "missing or invalid admin token")
    }
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        let status = match &err {
            InventoryError::Validation(_)
            | InventoryError::InvalidQuantity(_)
            | InventoryError::InsufficientStock { .. }
            | InventoryError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
            InventoryError::DuplicateName(_) | InventoryError::CategoryInUse(_) => {
                StatusCode::CONFLICT
            }
            InventoryError::NotFound { .. } => StatusCode::NOT_FOUND,
            InventoryError::Storage(_) => {
                error!(error = %err, "storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}
