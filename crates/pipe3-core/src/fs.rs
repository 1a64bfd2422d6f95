//! Recursive directory creation

use crate::error::{Pipe3Error, Result};
use std::fs::DirBuilder;
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

/// Make a directory and all missing parent directories, owner-only (0700).
///
/// Succeeds when the directory already exists. Any failure leaves whatever
/// parents could be created in place.
pub fn full_mkdir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    let created = DirBuilder::new().recursive(true).mode(0o700).create(path);
    match created {
        Ok(()) => Ok(()),
        // Lost a race with another creator, or the path was already a directory.
        Err(_) if path.is_dir() => Ok(()),
        Err(source) => Err(Pipe3Error::Directory {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    #[test]
    fn test_creates_nested_directories() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("a/b/c");

        full_mkdir(&target).unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn test_trailing_slash_accepted() {
        let tmp = TempDir::new().unwrap();
        let target = format!("{}/x/y/", tmp.path().display());

        full_mkdir(&target).unwrap();
        assert!(tmp.path().join("x/y").is_dir());
    }

    #[test]
    fn test_existing_directory_is_ok() {
        let tmp = TempDir::new().unwrap();
        full_mkdir(tmp.path()).unwrap();
        full_mkdir(tmp.path()).unwrap();
    }

    #[test]
    fn test_owner_only_mode() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("private");

        full_mkdir(&target).unwrap();
        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[test]
    fn test_file_in_the_way_fails() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file");
        std::fs::write(&file, b"not a dir").unwrap();

        let err = full_mkdir(file.join("below")).unwrap_err();
        assert!(matches!(err, Pipe3Error::Directory { .. }));
        assert!(err.to_string().contains("below"));
    }
}
