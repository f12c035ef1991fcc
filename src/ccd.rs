//! Atomic replacement of the CCD destination file.

use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::RouteError;
use crate::fs_abstraction::FileSystem;
use crate::route::{render, RouteEntry};

/// How the destination file ended up being replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Staged next to the destination and renamed over it.
    Atomic,
    /// Staged elsewhere and copied over the destination (not atomic).
    Copied,
}

/// Writes rendered route directives to a CCD file.
pub struct CcdWriter<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
}

impl<'a, F: FileSystem + ?Sized> CcdWriter<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    /// Render `entries` and replace `dest` with the result.
    pub fn write(&self, dest: &Path, entries: &[RouteEntry]) -> Result<WriteMode, RouteError> {
        self.write_body(dest, render(entries).as_bytes())
    }

    /// Replace `dest` with `body`.
    ///
    /// A reader of `dest` sees either the old content or the new content.
    /// When the destination directory denies creating a staging file, the
    /// body is staged in the temp directory and copied, which is logged as
    /// a warning. Any other staging error leaves `dest` untouched.
    pub fn write_body(&self, dest: &Path, body: &[u8]) -> Result<WriteMode, RouteError> {
        let dir = staging_dir(dest);

        match self.fs.stage_in(dir, body) {
            Ok(staged) => {
                debug!("Staged {} bytes in {}", body.len(), staged.display());
                if let Err(e) = self.fs.rename(&staged, dest) {
                    self.fs.remove_file(&staged).ok();
                    return Err(e.into());
                }
                Ok(WriteMode::Atomic)
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                warn!(
                    "Cannot stage next to {} ({}); replacing it with a non-atomic copy",
                    dest.display(),
                    e
                );
                let staged = self.fs.stage_in(&self.fs.temp_dir(), body)?;
                let copied = self.fs.copy(&staged, dest);
                self.fs.remove_file(&staged).ok();
                copied?;
                Ok(WriteMode::Copied)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Directory that holds the destination, `.` for bare file names.
fn staging_dir(dest: &Path) -> &Path {
    match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
