//! Filesystem abstraction layer for testability
//!
//! The CCD writer and the host list reader go through this trait, so the
//! staging and fallback paths can be exercised with `mockall` mocks instead
//! of real directories.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

/// Prefix of staging files created next to the destination.
const STAGING_PREFIX: &str = ".ccdroutes-";

/// Trait abstracting the filesystem operations ccdroutes needs.
///
/// # Example (testing)
/// ```ignore
/// use ccdroutes::fs_abstraction::MockFileSystem;
/// use std::path::Path;
///
/// let mut mock_fs = MockFileSystem::new();
/// mock_fs.expect_read_to_string()
///     .returning(|_| Ok("example.com\n".to_string()));
/// ```
#[cfg_attr(test, automock)]
pub trait FileSystem: Send + Sync {
    /// Read file contents as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write `contents` to a new staging file inside `dir`, flushed to disk.
    /// Returns the staging file's path; the caller owns its cleanup.
    fn stage_in(&self, dir: &Path, contents: &[u8]) -> io::Result<PathBuf>;

    /// Atomically rename `from` over `to` (same filesystem).
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Copy a file from one location to another.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Directory used for staging when the destination's own directory
    /// cannot hold a staging file.
    fn temp_dir(&self) -> PathBuf;
}

/// Real filesystem implementation using std::fs and tempfile.
#[derive(Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn stage_in(&self, dir: &Path, contents: &[u8]) -> io::Result<PathBuf> {
        let mut staged = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(".tmp")
            .tempfile_in(dir)?;

        staged.write_all(contents)?;
        staged.as_file().sync_all()?;

        let (_file, path) = staged.keep().map_err(|e| e.error)?;
        Ok(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        std::fs::copy(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn temp_dir(&self) -> PathBuf {
        std::env::temp_dir()
    }
}

/// Global filesystem instance for production use.
static REAL_FS: RealFileSystem = RealFileSystem;

/// Get a reference to the global real filesystem instance.
///
/// For testing, create a `MockFileSystem` instead.
pub fn real_fs() -> &'static RealFileSystem {
    &REAL_FS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_real_fs_stage_in() {
        let temp_dir = TempDir::new().unwrap();
        let fs = RealFileSystem;

        let staged = fs.stage_in(temp_dir.path(), b"push \"route\"\n").unwrap();

        assert_eq!(staged.parent(), Some(temp_dir.path()));
        assert!(staged
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(STAGING_PREFIX));
        assert_eq!(fs.read_to_string(&staged).unwrap(), "push \"route\"\n");
    }

    #[test]
    fn test_real_fs_stage_in_missing_dir() {
        let fs = RealFileSystem;
        let result = fs.stage_in(Path::new("/nonexistent/dir"), b"x");
        assert!(result.is_err());
    }

    #[test]
    fn test_real_fs_rename_replaces_target() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("client.ccd");
        std::fs::write(&target, "old").unwrap();

        let fs = RealFileSystem;
        let staged = fs.stage_in(temp_dir.path(), b"new").unwrap();
        fs.rename(&staged, &target).unwrap();

        assert_eq!(fs.read_to_string(&target).unwrap(), "new");
        assert!(!staged.exists());
    }

    #[test]
    fn test_real_fs_copy() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src.txt");
        let dst = temp_dir.path().join("dst.txt");
        std::fs::write(&src, "copy me").unwrap();

        let fs = RealFileSystem;
        let bytes_copied = fs.copy(&src, &dst).unwrap();

        assert_eq!(bytes_copied, 7);
        assert_eq!(fs.read_to_string(&dst).unwrap(), "copy me");
    }

    #[test]
    fn test_real_fs_remove_file() {
        let temp_dir = TempDir::new().unwrap();
        let fs = RealFileSystem;
        let staged = fs.stage_in(temp_dir.path(), b"remove me").unwrap();

        fs.remove_file(&staged).unwrap();
        assert!(!staged.exists());
    }

    #[test]
    fn test_real_fs_read_nonexistent() {
        let fs = RealFileSystem;
        let result = fs.read_to_string(Path::new("/nonexistent/path/file.txt"));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_real_fs_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RealFileSystem>();
    }

    #[test]
    fn test_mock_fs_error_simulation() {
        let mut mock = MockFileSystem::new();
        mock.expect_stage_in().returning(|_, _| {
            Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "access denied",
            ))
        });

        let result = mock.stage_in(Path::new("/etc/openvpn/ccd"), b"data");
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::PermissionDenied);
    }
}
