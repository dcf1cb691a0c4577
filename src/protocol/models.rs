//! Request and response bodies exchanged over the HTTP API.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/lua/create`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScriptRequest {
    /// Path relative to the server root; `.lua` is appended when missing
    pub path: String,
    pub content: String,
    #[serde(default)]
    pub overwrite: bool,
}

/// Returned with `201 Created`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScriptResponse {
    pub message: String,
    /// Root-relative path that was written
    pub path: String,
}

/// Returned by the listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListResponse {
    pub files: Vec<String>,
}
