//! Path validation
//!
//! Turns untrusted relative paths into canonical absolute paths that are
//! guaranteed to live under the server root. Containment is always checked
//! with `Path::starts_with` on canonical paths, which compares whole
//! components, so a sibling such as `/srv/lua_files-evil` never passes for
//! `/srv/lua_files`.
//!
//! `..` is applied lexically before any symlink is followed, so `alias/../x`
//! means `<root>/x` even when `alias` links elsewhere. A realpath lookup would
//! instead give `<alias target>/../x`. Either way the result must still land
//! inside the root.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::StorageError;

/// Extension every stored script carries
pub const SCRIPT_EXTENSION: &str = ".lua";

/// Canonical root directory all storage operations are confined to.
#[derive(Debug, Clone)]
pub struct SandboxRoot {
    path: PathBuf,
}

/// A path that has been verified to lie inside a [`SandboxRoot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    absolute: PathBuf,
    relative: String,
}

impl SandboxRoot {
    /// Opens an existing directory as the sandbox root, canonicalizing it.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().canonicalize()?;
        if !path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                "server root is not a directory",
            ));
        }
        Ok(Self { path })
    }

    /// Returns the canonical root path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves `relative_path` against this root.
    pub fn resolve(&self, relative_path: &str) -> Result<ResolvedPath, StorageError> {
        resolve_path(self, relative_path)
    }
}

impl ResolvedPath {
    /// Canonical absolute path on disk.
    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    /// Normalized root-relative form using `/` separators.
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// True when the path names the root directory itself.
    pub fn is_root(&self) -> bool {
        self.relative.is_empty()
    }
}

/// Returns true if the path already carries the script extension
pub fn has_script_extension(path: &str) -> bool {
    path.ends_with(SCRIPT_EXTENSION)
}

/// Appends the script extension unless it is already present
pub fn with_script_extension(path: &str) -> String {
    if has_script_extension(path) {
        path.to_string()
    } else {
        format!("{path}{SCRIPT_EXTENSION}")
    }
}

/// Lexically normalizes a relative path into its segments.
///
/// Rejects empty input, NUL bytes, absolute paths and any `..` that would
/// climb above the root. `.` segments are dropped.
pub fn normalize_segments(relative_path: &str) -> Result<Vec<&str>, StorageError> {
    if relative_path.trim().is_empty() {
        return Err(StorageError::InvalidPath("empty path".into()));
    }

    if relative_path.contains('\0') {
        return Err(StorageError::InvalidPath(relative_path.replace('\0', "\\0")));
    }

    let mut segments = Vec::new();
    for component in Path::new(relative_path).components() {
        match component {
            Component::Normal(name) => {
                let name = name
                    .to_str()
                    .ok_or_else(|| StorageError::InvalidPath(relative_path.to_string()))?;
                segments.push(name);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if segments.pop().is_none() {
                    return Err(StorageError::InvalidPath(relative_path.to_string()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::InvalidPath(relative_path.to_string()));
            }
        }
    }

    Ok(segments)
}

/// Resolves a caller-supplied relative path to a canonical path under `root`.
///
/// Segments are canonicalized one at a time so that symlinks are followed by
/// the OS and checked against the root as soon as they are crossed. Once a
/// segment does not exist the remaining (already normalized) segments are
/// appended lexically, which lets callers resolve files that are about to be
/// created.
pub fn resolve_path(root: &SandboxRoot, relative_path: &str) -> Result<ResolvedPath, StorageError> {
    let segments = normalize_segments(relative_path)?;
    let escape = || StorageError::InvalidPath(relative_path.to_string());

    let mut resolved = root.path().to_path_buf();
    let mut remaining = segments.iter();

    while let Some(segment) = remaining.next() {
        let candidate = resolved.join(segment);
        match fs::canonicalize(&candidate) {
            Ok(canonical) => {
                if !canonical.starts_with(root.path()) {
                    return Err(escape());
                }
                resolved = canonical;
            }
            Err(e) if is_missing(&e) => {
                // A dangling symlink has no target we could verify.
                if fs::symlink_metadata(&candidate).is_ok() {
                    return Err(escape());
                }
                resolved = candidate;
                resolved.extend(remaining);
                break;
            }
            Err(e) => return Err(StorageError::IoError(e)),
        }
    }

    if !resolved.starts_with(root.path()) {
        return Err(escape());
    }

    Ok(ResolvedPath {
        absolute: resolved,
        relative: segments.join("/"),
    })
}

fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sandbox() -> (TempDir, SandboxRoot) {
        let dir = TempDir::new().unwrap();
        let root = SandboxRoot::open(dir.path()).unwrap();
        (dir, root)
    }

    fn assert_invalid(result: Result<ResolvedPath, StorageError>) {
        assert!(
            matches!(result, Err(StorageError::InvalidPath(_))),
            "expected InvalidPath, got {result:?}"
        );
    }

    #[test]
    fn test_resolve_simple_path() {
        let (_dir, root) = sandbox();
        let resolved = root.resolve("scripts/menu.lua").unwrap();

        assert_eq!(resolved.relative(), "scripts/menu.lua");
        assert_eq!(resolved.absolute(), root.path().join("scripts/menu.lua"));
    }

    #[test]
    fn test_resolve_normalizes_dots() {
        let (_dir, root) = sandbox();
        let resolved = root.resolve("./a/../b/./c.lua").unwrap();

        assert_eq!(resolved.relative(), "b/c.lua");
        assert_eq!(resolved.absolute(), root.path().join("b/c.lua"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let (_dir, root) = sandbox();

        assert_invalid(root.resolve("../../etc/passwd"));
        assert_invalid(root.resolve("a/../../b"));
        assert_invalid(root.resolve(".."));
    }

    #[test]
    fn test_resolve_rejects_absolute_and_empty() {
        let (_dir, root) = sandbox();

        assert_invalid(root.resolve("/etc/passwd"));
        assert_invalid(root.resolve(""));
        assert_invalid(root.resolve("   "));
        assert_invalid(root.resolve("bad\0name"));
    }

    #[test]
    fn test_resolve_root_itself() {
        let (_dir, root) = sandbox();
        let resolved = root.resolve("a/..").unwrap();

        assert!(resolved.is_root());
        assert_eq!(resolved.absolute(), root.path());
    }

    #[test]
    fn test_sibling_directory_is_not_inside_root() {
        let parent = TempDir::new().unwrap();
        fs::create_dir(parent.path().join("root")).unwrap();
        fs::create_dir(parent.path().join("root-evil")).unwrap();
        let root = SandboxRoot::open(parent.path().join("root")).unwrap();

        assert_invalid(root.resolve("../root-evil/x.lua"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_sibling_with_shared_prefix_rejected() {
        use std::os::unix::fs::symlink;

        let parent = TempDir::new().unwrap();
        fs::create_dir(parent.path().join("root")).unwrap();
        fs::create_dir(parent.path().join("root-evil")).unwrap();
        symlink(
            parent.path().join("root-evil"),
            parent.path().join("root").join("evil"),
        )
        .unwrap();
        let root = SandboxRoot::open(parent.path().join("root")).unwrap();

        assert_invalid(root.resolve("evil/x.lua"));
    }

    #[test]
    fn test_traversal_never_escapes() {
        let (_dir, root) = sandbox();
        fs::create_dir_all(root.path().join("a/b")).unwrap();

        let pieces = ["..", "a", "b", ".", "x.lua"];
        for first in pieces {
            for second in pieces {
                for third in pieces {
                    for fourth in pieces {
                        let path = format!("{first}/{second}/{third}/{fourth}");
                        match root.resolve(&path) {
                            Ok(resolved) => assert!(
                                resolved.absolute().starts_with(root.path()),
                                "{path} escaped to {:?}",
                                resolved.absolute()
                            ),
                            Err(StorageError::InvalidPath(_)) => {}
                            Err(e) => panic!("unexpected error for {path}: {e}"),
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_file_used_as_directory_resolves_lexically() {
        let (_dir, root) = sandbox();
        fs::write(root.path().join("a.lua"), "return 1").unwrap();

        let resolved = root.resolve("a.lua/b").unwrap();
        assert_eq!(resolved.absolute(), root.path().join("a.lua/b"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        use std::os::unix::fs::symlink;

        let (_dir, root) = sandbox();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.lua"), "leak").unwrap();
        symlink(outside.path(), root.path().join("link")).unwrap();
        symlink(
            outside.path().join("secret.lua"),
            root.path().join("secret.lua"),
        )
        .unwrap();

        assert_invalid(root.resolve("link/secret.lua"));
        assert_invalid(root.resolve("link/new.lua"));
        assert_invalid(root.resolve("secret.lua"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_inside_root_allowed() {
        use std::os::unix::fs::symlink;

        let (_dir, root) = sandbox();
        fs::create_dir(root.path().join("real")).unwrap();
        symlink(root.path().join("real"), root.path().join("alias")).unwrap();

        let resolved = root.resolve("alias/menu.lua").unwrap();
        assert_eq!(resolved.absolute(), root.path().join("real/menu.lua"));
        assert_eq!(resolved.relative(), "alias/menu.lua");
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_rejected() {
        use std::os::unix::fs::symlink;

        let (_dir, root) = sandbox();
        symlink("/nonexistent/target.lua", root.path().join("ghost.lua")).unwrap();

        assert_invalid(root.resolve("ghost.lua"));
    }

    #[test]
    fn test_script_extension_helpers() {
        assert!(has_script_extension("menu.lua"));
        assert!(!has_script_extension("menu"));
        assert_eq!(with_script_extension("menu"), "menu.lua");
        assert_eq!(with_script_extension("sub/menu.lua"), "sub/menu.lua");
        assert_eq!(with_script_extension("notes.txt"), "notes.txt.lua");
    }
}
