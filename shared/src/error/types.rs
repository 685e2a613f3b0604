//! `AppError` and the JSON body it renders to

use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Error carried by every failed request
///
/// The code decides the HTTP status; the message is safe to show a
/// shopper; `details` names offending fields or ids.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<Map<String, Value>>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach one `key: value` pair to `details`
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_default()
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    /// `RequiredField` listing what the request left out
    pub fn missing_fields(fields: &[&str]) -> Self {
        Self::with_message(
            ErrorCode::RequiredField,
            format!("Missing required fields: {}", fields.join(", ")),
        )
        .with_detail("fields", fields.to_vec())
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, reason)
    }

    /// Opaque 500; log the cause before calling this
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, message)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort_unstable();
        Self::with_message(
            ErrorCode::ValidationFailed,
            format!("Invalid fields: {}", fields.join(", ")),
        )
        .with_detail("fields", fields)
    }
}

/// JSON body of a failed request: `{"code": 3001, "message": "...", "details": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!(code = %self.code, message = %self.message, "Request failed on the server side");
        }
        (status, axum::Json(ErrorResponse::from(&self))).into_response()
    }
}
