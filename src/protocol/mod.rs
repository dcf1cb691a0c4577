//! HTTP protocol implementation
//!
//! Request models, transport-independent handlers, response building and the
//! warp route tree.

pub mod handlers;
pub mod models;
pub mod responses;
pub mod routes;

pub use models::{CreateScriptRequest, CreateScriptResponse, FileListResponse};
pub use routes::routes;
