use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::encoder::EncodeError;
use crate::predictor::ModelError;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Configuration error
    ConfigError(String),
    /// Model artifact error (missing, corrupt, or inconsistent)
    ModelError(String),
    /// Car specification failed range validation
    Validation(Vec<String>),
    /// Categorical value outside the training-time category set
    UnknownCategory { field: String, value: String },
    /// Currency code absent from the rate table
    UnknownCurrency(String),
    /// Rate endpoint reachable but returned an unusable payload
    RateUnavailable(String),
    /// HTTP request error (preserves reqwest::Error for diagnostics)
    HttpRequest(reqwest::Error),
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::ModelError(msg) => write!(f, "Model error: {}", msg),
            Self::Validation(errors) => write!(f, "Invalid input: {}", errors.join("; ")),
            Self::UnknownCategory { field, value } => {
                write!(f, "Unknown {} value: {:?}", field, value)
            }
            Self::UnknownCurrency(code) => write!(f, "Unknown currency code: {}", code),
            Self::RateUnavailable(msg) => write!(f, "Exchange rates unavailable: {}", msg),
            Self::HttpRequest(err) => write!(f, "HTTP request error: {}", err),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Stable machine-readable error type, used in responses and metrics labels
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "config_error",
            Self::ModelError(_) => "model_error",
            Self::Validation(_) => "validation_error",
            Self::UnknownCategory { .. } => "unknown_category",
            Self::UnknownCurrency(_) => "unknown_currency",
            Self::RateUnavailable(_) => "rate_unavailable",
            Self::HttpRequest(_) => "http_request_error",
            Self::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::ConfigError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Self::ModelError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Self::Validation(errors) => (StatusCode::UNPROCESSABLE_ENTITY, errors.join("; ")),
            Self::UnknownCategory { field, value } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("unknown {} value: {:?}", field, value),
            ),
            Self::UnknownCurrency(code) => (
                StatusCode::BAD_REQUEST,
                format!("unknown currency code: {}", code),
            ),
            Self::RateUnavailable(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            Self::HttpRequest(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
            Self::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": self.error_type(),
            }
        }));

        (status, body).into_response()
    }
}

// Implement conversions from common error types
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpRequest(err)
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        Self::ModelError(err.to_string())
    }
}

impl From<EncodeError> for AppError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::UnknownCategory { field, value } => {
                Self::UnknownCategory { field, value }
            }
            EncodeError::UnsupportedColumn(name) => {
                Self::ModelError(format!("schema references unknown feature column {:?}", name))
            }
        }
    }
}
