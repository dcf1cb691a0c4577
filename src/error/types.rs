//! Error types
//!
//! Defines domain-specific error types for each module of the Lua server.
//! Messages only ever carry root-relative paths so they are safe to return
//! to clients.

use std::io;
use thiserror::Error;

/// Authentication module errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer credentials")]
    MissingCredentials,

    #[error("Malformed authorization header")]
    MalformedHeader,

    #[error("Invalid bearer token")]
    InvalidToken,
}

/// Storage module errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid file path: {0}")]
    InvalidPath(String),

    #[error("Invalid file type: {0}")]
    InvalidType(String),

    #[error("Lua file not found: {0}")]
    FileNotFound(String),

    #[error("File already exists: {0}")]
    FileAlreadyExists(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// General server error that encompasses all error types
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// True for errors caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StorageError::IoError(_))
    }
}
