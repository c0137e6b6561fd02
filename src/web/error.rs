//! HTTP mapping of [`WayfisError`]

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use crate::handlers::log_handler_error;
use crate::utils::errors::WayfisError;

impl WayfisError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WayfisError::NotFound { .. } => StatusCode::NOT_FOUND,
            WayfisError::InvalidInput(_)
            | WayfisError::InvalidAmount(_)
            | WayfisError::InsufficientFunds { .. } => StatusCode::BAD_REQUEST,
            WayfisError::DuplicateKey(_)
            | WayfisError::OutOfStock { .. }
            | WayfisError::AlreadyUsed { .. } => StatusCode::CONFLICT,
            WayfisError::Authentication(_) => StatusCode::UNAUTHORIZED,
            WayfisError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            WayfisError::Gateway(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WayfisError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        log_handler_error(&self);

        let message = if status.is_client_error() {
            self.to_string()
        } else {
            "internal error".to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
