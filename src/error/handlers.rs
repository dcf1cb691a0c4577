//! Error handlers
//!
//! Maps server errors to HTTP status codes and structured error payloads.

use chrono::{DateTime, Utc};
use log::{error, warn};
use serde::Serialize;
use warp::http::StatusCode;

use crate::error::types::{ServerError, StorageError};

/// Structured error body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: message.into(),
            code: status.as_u16(),
            details,
            timestamp: Utc::now(),
        }
    }

    /// Builds the payload for a server error, keeping the detail string of the
    /// originating error when there is one.
    pub fn from_error(err: &ServerError) -> Self {
        let status = error_to_status_code(err);
        let (message, details) = match err {
            ServerError::Auth(e) => ("Unauthorized".to_string(), Some(e.to_string())),
            ServerError::Storage(e) => (storage_message(e).to_string(), Some(e.to_string())),
            ServerError::Validation(msg) => (msg.clone(), None),
            ServerError::Config(e) => ("Server misconfigured".to_string(), Some(e.to_string())),
            ServerError::IoError(e) => (
                "An OS error occurred while processing the request.".to_string(),
                Some(e.to_string()),
            ),
            ServerError::Internal(msg) => (
                "An unexpected error occurred while processing the request.".to_string(),
                Some(msg.clone()),
            ),
        };

        let mut response = Self::new(status, message, details);
        if let ServerError::Validation(_) = err {
            response.error = "Validation Error".to_string();
        }
        response
    }
}

fn storage_message(err: &StorageError) -> &'static str {
    match err {
        StorageError::InvalidPath(_) => "Invalid file path",
        StorageError::InvalidType(_) => "Invalid file type",
        StorageError::FileNotFound(_) => "Lua file not found",
        StorageError::FileAlreadyExists(_) => {
            "File already exists. Use overwrite flag to replace it."
        }
        StorageError::IoError(_) => "An OS error occurred while processing the request.",
    }
}

/// Log a server error at a level matching who caused it
pub fn handle_error(err: &ServerError) {
    match err {
        ServerError::Storage(e) if e.is_client_error() => warn!("Request rejected: {}", err),
        ServerError::Auth(_) | ServerError::Validation(_) => warn!("Request rejected: {}", err),
        _ => error!("Server error: {}", err),
    }
}

/// Convert error to HTTP status code
pub fn error_to_status_code(err: &ServerError) -> StatusCode {
    match err {
        ServerError::Auth(_) => StatusCode::UNAUTHORIZED,
        ServerError::Storage(StorageError::InvalidPath(_)) => StatusCode::BAD_REQUEST,
        ServerError::Storage(StorageError::InvalidType(_)) => StatusCode::BAD_REQUEST,
        ServerError::Storage(StorageError::FileNotFound(_)) => StatusCode::NOT_FOUND,
        ServerError::Storage(StorageError::FileAlreadyExists(_)) => StatusCode::CONFLICT,
        ServerError::Storage(StorageError::IoError(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        ServerError::Validation(_) => StatusCode::BAD_REQUEST,
        ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServerError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
