//! Error types for the officekit server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::office::OfficeError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Office error: {0}")]
    Office(#[from] OfficeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    fn classify(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Office(e) => match e {
                OfficeError::DocumentNotFound(_) => {
                    (StatusCode::NOT_FOUND, "not_found", e.to_string())
                }
                OfficeError::DocumentLoadFailed { reason, .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "load_failed",
                    format!("Document could not be loaded: {}", reason),
                ),
                OfficeError::Timeout(limit) => {
                    tracing::warn!(?limit, "Document load timed out");
                    (
                        StatusCode::GATEWAY_TIMEOUT,
                        "timeout",
                        format!("Document load did not finish within {:?}", limit),
                    )
                }
                OfficeError::InvalidArgument(msg) => {
                    (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
                }
                OfficeError::SaveFailed { reason, .. } => {
                    tracing::error!("Save failed: {}", reason);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "save_failed",
                        "Document could not be converted".to_string(),
                    )
                }
                _ => {
                    tracing::error!("Office error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "office_error",
                        "Document engine error".to_string(),
                    )
                }
            },
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "io_error",
                    "IO error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = self.classify();

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}
