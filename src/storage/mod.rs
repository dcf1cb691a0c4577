//! File system storage management
//!
//! Sandboxed path resolution plus the retrieve, store and list operations.

pub mod filesystem;
pub mod operations;
pub mod results;
pub mod validation;

pub use operations::{list_files, retrieve_file, store_file};
pub use results::{ListResult, RetrieveResult, StoreResult};
pub use validation::{ResolvedPath, SCRIPT_EXTENSION, SandboxRoot};
