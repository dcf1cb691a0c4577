//! Storage result types
//!
//! Defines result structures returned by storage operations. Paths in these
//! results are always relative to the server root.

/// Result of a script listing operation
#[derive(Debug, Clone, Default)]
pub struct ListResult {
    pub files: Vec<String>,
}

/// Result of a file retrieval operation
#[derive(Debug, Clone)]
pub struct RetrieveResult {
    pub content: Vec<u8>,
    pub relative_path: String,
}

/// Result of a file storage operation
#[derive(Debug, Clone)]
pub struct StoreResult {
    pub relative_path: String,
    /// False when an existing file was overwritten
    pub created: bool,
}
