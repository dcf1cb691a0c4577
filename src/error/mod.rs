//! Error handling
//!
//! Defines error types and their translation into HTTP responses.

pub mod handlers;
pub mod types;

pub use handlers::{ErrorResponse, error_to_status_code};
pub use types::*;
