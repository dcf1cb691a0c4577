//! Request handlers for the Lua script API.
//!
//! These functions are transport independent: they take already extracted
//! request parts, run the storage operation and return typed results. The
//! warp routes in `routes.rs` only do extraction and reply building.

use log::info;

use crate::auth;
use crate::error::ServerError;
use crate::protocol::models::{CreateScriptRequest, CreateScriptResponse, FileListResponse};
use crate::server::ServerContext;
use crate::storage::{self, RetrieveResult};

/// Handles a listing request: every `.lua` file under the root.
pub fn handle_list(ctx: &ServerContext) -> Result<FileListResponse, ServerError> {
    let listing = storage::list_files(ctx.root())?;
    Ok(FileListResponse {
        files: listing.files,
    })
}

/// Handles a retrieval request for an already percent-decoded relative path.
pub fn handle_retrieve(ctx: &ServerContext, relative_path: &str) -> Result<RetrieveResult, ServerError> {
    Ok(storage::retrieve_file(ctx.root(), relative_path)?)
}

/// Handles a create/overwrite request.
///
/// The credential is checked before the body is even parsed, so an
/// unauthorized caller cannot trigger any path resolution or I/O.
pub fn handle_create(
    ctx: &ServerContext,
    authorization: Option<&[u8]>,
    body: &[u8],
) -> Result<CreateScriptResponse, ServerError> {
    // 1. Authentication check
    auth::validate_bearer(authorization, ctx.auth_key())?;

    // 2. Request body
    let request: CreateScriptRequest =
        serde_json::from_slice(body).map_err(|e| ServerError::Validation(e.to_string()))?;

    // 3. Store
    let stored = storage::store_file(
        ctx.root(),
        &request.path,
        request.content.as_bytes(),
        request.overwrite,
    )?;

    info!(
        "Create request for {:?} {} {}",
        request.path,
        if stored.created { "created" } else { "overwrote" },
        stored.relative_path
    );

    Ok(CreateScriptResponse {
        message: "File successfully created or overwritten".to_string(),
        path: stored.relative_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthError, StorageError};
    use crate::storage::SandboxRoot;
    use std::fs;
    use tempfile::TempDir;

    const KEY: &str = "test-key";
    const GOOD: Option<&[u8]> = Some(b"Bearer test-key");
    const BAD: Option<&[u8]> = Some(b"Bearer wrong");

    fn context() -> (TempDir, ServerContext) {
        let dir = TempDir::new().unwrap();
        let root = SandboxRoot::open(dir.path()).unwrap();
        (dir, ServerContext::new(root, KEY))
    }

    fn body(path: &str, content: &str, overwrite: bool) -> Vec<u8> {
        serde_json::json!({ "path": path, "content": content, "overwrite": overwrite })
            .to_string()
            .into_bytes()
    }

    #[test]
    fn test_create_then_list_and_retrieve() {
        let (_dir, ctx) = context();

        let response =
            handle_create(&ctx, GOOD, &body("menu", "return {}", false)).unwrap();
        assert_eq!(response.path, "menu.lua");

        assert_eq!(handle_list(&ctx).unwrap().files, vec!["menu.lua".to_string()]);
        assert_eq!(handle_retrieve(&ctx, "menu").unwrap().content, b"return {}");
    }

    #[test]
    fn test_unauthorized_create_touches_nothing() {
        let (dir, ctx) = context();

        let err = handle_create(&ctx, BAD, &body("menu", "x", true)).unwrap_err();
        assert!(matches!(err, ServerError::Auth(AuthError::InvalidToken)));

        let err = handle_create(&ctx, None, &body("menu", "x", true)).unwrap_err();
        assert!(matches!(err, ServerError::Auth(AuthError::MissingCredentials)));

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_auth_checked_before_body() {
        let (_dir, ctx) = context();

        let err = handle_create(&ctx, BAD, b"not json").unwrap_err();
        assert!(matches!(err, ServerError::Auth(_)));

        let err = handle_create(&ctx, GOOD, b"not json").unwrap_err();
        assert!(matches!(err, ServerError::Validation(_)));
    }

    #[test]
    fn test_overwrite_defaults_to_false() {
        let (_dir, ctx) = context();
        let request = br#"{"path": "a", "content": "1"}"#;

        handle_create(&ctx, GOOD, request).unwrap();
        let err = handle_create(&ctx, GOOD, request).unwrap_err();
        assert!(matches!(
            err,
            ServerError::Storage(StorageError::FileAlreadyExists(_))
        ));
    }
}
