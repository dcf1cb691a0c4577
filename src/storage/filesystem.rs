//! File system operations
//!
//! Thin wrappers over `std::fs` used by the storage operations.

use std::fs::{self, OpenOptions};
use std::io::{self, Result, Write};
use std::path::Path;

/// What currently occupies a path on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Missing,
    File,
    Other,
}

/// Create a directory and any missing parents
pub fn create_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
}

/// Inspect a path, following symlinks.
///
/// Only "not found" style errors count as `Missing`; anything else (such as
/// permission denied) is returned to the caller.
pub fn entry_kind(path: &Path) -> Result<EntryKind> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => Ok(EntryKind::File),
        Ok(_) => Ok(EntryKind::Other),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            Ok(EntryKind::Missing)
        }
        Err(e) => Err(e),
    }
}

/// Write `content` to `path`, replacing whatever was there.
///
/// With `create_new` the open fails with `AlreadyExists` if the file appeared
/// since the caller last looked.
pub fn write_file(path: &Path, content: &[u8], create_new: bool) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true);
    if create_new {
        options.create_new(true);
    } else {
        options.create(true).truncate(true);
    }

    let mut file = options.open(path)?;
    file.write_all(content)?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_entry_kind() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.lua");
        fs::write(&file, "x").unwrap();

        assert_eq!(entry_kind(&file).unwrap(), EntryKind::File);
        assert_eq!(entry_kind(dir.path()).unwrap(), EntryKind::Other);
        assert_eq!(entry_kind(&dir.path().join("b.lua")).unwrap(), EntryKind::Missing);
        assert_eq!(entry_kind(&file.join("nested")).unwrap(), EntryKind::Missing);
    }

    #[test]
    fn test_write_file_create_new_refuses_existing() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.lua");
        fs::write(&file, "old").unwrap();

        let err = write_file(&file, b"new", true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&file).unwrap(), "old");
    }

    #[test]
    fn test_write_file_truncates() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.lua");
        fs::write(&file, "a much longer original body").unwrap();

        write_file(&file, b"short", false).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "short");
    }
}
