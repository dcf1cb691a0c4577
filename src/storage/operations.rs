//! Storage operations
//!
//! Retrieve, store and list Lua scripts under the server root. Every path
//! goes through [`SandboxRoot::resolve`] before any I/O happens.

use log::{error, info, warn};
use std::fs;
use std::io;
use std::path::{Component, Path};

use crate::error::StorageError;
use crate::storage::filesystem::{EntryKind, create_directory, entry_kind, write_file};
use crate::storage::results::{ListResult, RetrieveResult, StoreResult};
use crate::storage::validation::{
    ResolvedPath, SCRIPT_EXTENSION, SandboxRoot, has_script_extension, with_script_extension,
};

/// Resolve a path, logging the raw request if it was rejected.
fn resolve_logged(root: &SandboxRoot, relative_path: &str) -> Result<ResolvedPath, StorageError> {
    root.resolve(relative_path).inspect_err(|e| {
        if let StorageError::InvalidPath(_) = e {
            warn!("Invalid file path access attempt: {relative_path:?}");
        }
    })
}

/// Retrieves a script by relative path.
///
/// The exact path wins when it is a regular file. Otherwise, if the request
/// has no `.lua` suffix, the suffixed name is tried.
pub fn retrieve_file(root: &SandboxRoot, relative_path: &str) -> Result<RetrieveResult, StorageError> {
    let exact = resolve_logged(root, relative_path)?;
    if exact.is_root() {
        info!("Lua file not found: {relative_path}");
        return Err(StorageError::FileNotFound(relative_path.to_string()));
    }

    let target = if entry_kind(exact.absolute())? == EntryKind::File {
        exact
    } else if !has_script_extension(relative_path) {
        let suffixed = resolve_logged(root, &with_script_extension(relative_path))?;
        if entry_kind(suffixed.absolute())? != EntryKind::File {
            info!("Lua file not found: {relative_path}");
            return Err(StorageError::FileNotFound(relative_path.to_string()));
        }
        suffixed
    } else {
        info!("Lua file not found: {relative_path}");
        return Err(StorageError::FileNotFound(relative_path.to_string()));
    };

    let content = fs::read(target.absolute()).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            StorageError::FileNotFound(relative_path.to_string())
        } else {
            error!("Failed to read {}: {}", target.relative(), e);
            StorageError::IoError(e)
        }
    })?;

    info!("Serving Lua file: {} ({} bytes)", target.relative(), content.len());

    Ok(RetrieveResult {
        content,
        relative_path: target.relative().to_string(),
    })
}

/// Checks that the last segment of a write request names a file.
fn validate_file_name(relative_path: &str) -> Result<(), StorageError> {
    // `Path::components` folds a trailing `.` away, so look at the raw text.
    let last_segment = relative_path.rsplit('/').next().unwrap_or_default();
    if matches!(last_segment, "" | "." | "..") {
        return Err(StorageError::InvalidPath(relative_path.to_string()));
    }

    match Path::new(relative_path).components().next_back() {
        Some(Component::Normal(name)) if name == SCRIPT_EXTENSION => Err(
            StorageError::InvalidType(format!("missing file name before {SCRIPT_EXTENSION}")),
        ),
        Some(Component::Normal(_)) => Ok(()),
        _ => Err(StorageError::InvalidPath(relative_path.to_string())),
    }
}

/// Creates or overwrites a script.
///
/// Steps run strictly in order: name validation, extension normalization,
/// resolution, existence check, parent directory creation, write. The caller
/// is responsible for authorizing the request first.
pub fn store_file(
    root: &SandboxRoot,
    relative_path: &str,
    content: &[u8],
    overwrite: bool,
) -> Result<StoreResult, StorageError> {
    // 1. The request must name a file
    validate_file_name(relative_path).inspect_err(|_| {
        warn!("Invalid file path in store request: {relative_path:?}");
    })?;

    // 2. Conflict check and write both target the suffixed name
    let normalized = with_script_extension(relative_path);

    // 3. Resolve inside the sandbox
    let resolved = resolve_logged(root, &normalized)?;

    // 4. Existence check
    let existed = match entry_kind(resolved.absolute())? {
        EntryKind::File if !overwrite => {
            warn!(
                "File already exists and overwrite not allowed: {}",
                resolved.relative()
            );
            return Err(StorageError::FileAlreadyExists(resolved.relative().to_string()));
        }
        EntryKind::File => true,
        EntryKind::Other => {
            return Err(StorageError::InvalidType(format!(
                "{} is not a regular file",
                resolved.relative()
            )));
        }
        EntryKind::Missing => false,
    };

    // 5. Parent directories
    if let Some(parent) = resolved.absolute().parent() {
        create_directory(parent).map_err(|e| {
            error!("Failed to create directory for {}: {}", resolved.relative(), e);
            StorageError::IoError(e)
        })?;
    }

    // 6. Write; without overwrite the file must still be new at open time
    write_file(resolved.absolute(), content, !overwrite).map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            warn!("File appeared before write: {}", resolved.relative());
            StorageError::FileAlreadyExists(resolved.relative().to_string())
        } else {
            error!("Failed to write {}: {}", resolved.relative(), e);
            StorageError::IoError(e)
        }
    })?;

    info!(
        "File successfully {}: {} ({} bytes)",
        if existed { "overwritten" } else { "created" },
        resolved.relative(),
        content.len()
    );

    Ok(StoreResult {
        relative_path: resolved.relative().to_string(),
        created: !existed,
    })
}

/// Lists every `.lua` file under the root as root-relative paths.
///
/// An unreadable root is an error. Unreadable subdirectories and entries are
/// logged and skipped so one bad branch does not hide the rest of the tree.
/// Symlinked directories are not descended.
pub fn list_files(root: &SandboxRoot) -> Result<ListResult, StorageError> {
    let entries = fs::read_dir(root.path()).map_err(|e| {
        error!("Failed to list server root: {e}");
        StorageError::IoError(e)
    })?;

    let mut files = Vec::new();
    collect_scripts(root, entries, "", &mut files);
    files.sort();

    info!("Listed {} Lua files", files.len());

    Ok(ListResult { files })
}

fn collect_scripts(root: &SandboxRoot, entries: fs::ReadDir, prefix: &str, files: &mut Vec<String>) {
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {prefix:?}: {e}");
                continue;
            }
        };

        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            warn!("Skipping non UTF-8 file name under {prefix:?}");
            continue;
        };

        let relative = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        };

        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                warn!("Skipping {relative}: {e}");
                continue;
            }
        };

        if file_type.is_dir() {
            match fs::read_dir(entry.path()) {
                Ok(children) => collect_scripts(root, children, &relative, files),
                Err(e) => warn!("Skipping directory {relative}: {e}"),
            }
        } else if has_script_extension(name)
            && (file_type.is_file()
                || (file_type.is_symlink() && link_stays_inside(root, &entry.path())))
        {
            files.push(relative);
        }
    }
}

/// True when a symlink points at a regular file inside the root.
fn link_stays_inside(root: &SandboxRoot, link: &Path) -> bool {
    match fs::canonicalize(link) {
        Ok(target) => target.starts_with(root.path()) && target.is_file(),
        Err(_) => false,
    }
}
