// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::store::StoreError;

/// API error taxonomy with appropriate status codes and client-safe messages.
/// Every failure surfaced by the service is converted into one of these at or
/// before the HTTP boundary; nothing propagates unhandled.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error; `internal` is logged and only exposed in
    // non-production mode
    StoreFailure { public: String, internal: String },

    // 503 Service Unavailable
    Configuration(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::StoreFailure { .. } => 500,
            ApiError::Configuration(_) => 503,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::StoreFailure { .. } => "STORE_FAILURE",
            ApiError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation { message, .. } => message,
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Configuration(msg) => msg,
            ApiError::StoreFailure { public, .. } => public,
        }
    }

    /// Error envelope: `{"success": false, "error": {code, message, details?}}`.
    pub fn to_json(&self) -> Value {
        let mut error = json!({
            "code": self.error_code(),
            "message": self.message(),
        });

        match self {
            ApiError::Validation { field_errors: Some(fields), .. } => {
                error["details"] = json!(fields);
            }
            ApiError::StoreFailure { internal, .. } if !crate::config::config().is_production() => {
                error["details"] = json!(internal);
            }
            _ => {}
        }

        json!({ "success": false, "error": error })
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::Validation { message: message.into(), field_errors }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn store_failure(public: impl Into<String>, internal: impl Into<String>) -> Self {
        ApiError::StoreFailure { public: public.into(), internal: internal.into() }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        ApiError::Configuration(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConfigMissing(key) => {
                tracing::error!("store configuration missing: {}", key);
                ApiError::configuration("record store is not configured")
            }
            other => {
                // Store messages are passed through, not interpreted; clients
                // only see them in non-production mode.
                tracing::error!("store failure: {}", other);
                ApiError::store_failure("record store operation failed", other.to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
