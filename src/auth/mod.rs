//! Authentication system
//!
//! Gates mutating requests behind the configured bearer secret.

pub mod validator;

pub use crate::error::AuthError;
pub use validator::validate_bearer;
