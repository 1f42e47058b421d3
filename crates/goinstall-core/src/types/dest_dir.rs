//! Destination directory of one extraction.

use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::fs::FileSystem;
use crate::security::path::clean_path;
use crate::security::path::has_dir_prefix;
use crate::security::path::resolve_existing_prefix;

/// The destination directory of one extraction.
///
/// Holds two forms of the destination, both computed once when the
/// extraction starts and never recomputed:
///
/// - the *clean* form: absolute and lexically cleaned, symlinks untouched.
///   Every path the extractor writes is derived from it.
/// - the *resolved* form: the clean form with symlinks in its existing
///   prefix resolved. Paths obtained from the filesystem through
///   `eval_symlinks` are compared against it, so a destination that itself
///   sits behind a symlink (e.g. `/tmp` on macOS) does not cause false
///   rejections.
///
/// The directory does not need to exist; it is created as entries are
/// materialized.
///
/// # Examples
///
/// ```
/// use goinstall_core::fs::OsFileSystem;
/// use goinstall_core::types::DestDir;
/// use std::path::Path;
///
/// # fn main() -> std::io::Result<()> {
/// let dest = DestDir::new(Path::new("/opt/sdk/./go/"), &OsFileSystem)?;
/// assert_eq!(dest.as_path(), Path::new("/opt/sdk/go"));
/// assert_eq!(dest.join_entry("bin/go"), Path::new("/opt/sdk/go/bin/go"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir {
    clean: PathBuf,
    resolved: PathBuf,
}

impl DestDir {
    /// Computes the clean and resolved forms of `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is empty, if the current directory cannot
    /// be determined for a relative `path`, or if resolving an existing
    /// prefix of it fails.
    pub fn new<F: FileSystem + ?Sized>(path: &Path, fs: &F) -> io::Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "destination directory must not be empty",
            ));
        }

        let clean = clean_path(&std::path::absolute(path)?);
        let resolved = resolve_existing_prefix(&clean, fs)?;

        Ok(Self { clean, resolved })
    }

    /// Returns the clean (lexical) destination path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.clean
    }

    /// Returns the destination path with symlinks resolved.
    #[inline]
    #[must_use]
    pub fn resolved(&self) -> &Path {
        &self.resolved
    }

    /// Joins a raw entry name onto the destination and cleans the result.
    ///
    /// The name must already have passed
    /// [`validate_header_name`](crate::security::validate_header_name); this
    /// method performs no validation of its own.
    #[must_use]
    pub fn join_entry(&self, name: &str) -> PathBuf {
        clean_path(&self.clean.join(name))
    }

    /// Returns `true` if `resolved` lies inside the destination, where
    /// `resolved` is a path returned by `eval_symlinks`.
    #[must_use]
    pub fn contains_resolved(&self, resolved: &Path) -> bool {
        let resolved = clean_path(resolved);
        within(&resolved, &self.resolved) || within(&resolved, &self.clean)
    }
}

fn within(path: &Path, root: &Path) -> bool {
    path.starts_with(root) && has_dir_prefix(path, root)
}
