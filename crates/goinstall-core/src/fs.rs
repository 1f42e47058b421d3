//! Filesystem abstraction used by the extractor.
//!
//! Every filesystem operation the extractor performs goes through the
//! [`FileSystem`] trait so extraction logic can be exercised against a
//! recording or scripted implementation in tests. [`OsFileSystem`] is the
//! real implementation backed by `std::fs`.

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

/// Kind of filesystem node reported by [`FileSystem::stat`] and
/// [`FileSystem::lstat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link (only reported by `lstat`).
    Symlink,
    /// Device, socket, FIFO, or anything else.
    Other,
}

/// Minimal metadata about a filesystem node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    /// Kind of node.
    pub kind: FileKind,
    /// Permission bits (`0` where the platform has none).
    pub mode: u32,
    /// Length in bytes.
    pub len: u64,
}

impl FileInfo {
    /// Returns `true` for regular files.
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self.kind, FileKind::File)
    }

    /// Returns `true` for directories.
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, FileKind::Directory)
    }

    /// Returns `true` for symbolic links.
    #[must_use]
    pub const fn is_symlink(&self) -> bool {
        matches!(self.kind, FileKind::Symlink)
    }
}

impl From<&fs::Metadata> for FileInfo {
    fn from(meta: &fs::Metadata) -> Self {
        let file_type = meta.file_type();
        let kind = if file_type.is_symlink() {
            FileKind::Symlink
        } else if file_type.is_dir() {
            FileKind::Directory
        } else if file_type.is_file() {
            FileKind::File
        } else {
            FileKind::Other
        };

        #[cfg(unix)]
        let mode = {
            use std::os::unix::fs::PermissionsExt;
            meta.permissions().mode() & 0o7777
        };
        #[cfg(not(unix))]
        let mode = if meta.permissions().readonly() {
            0o444
        } else {
            0o644
        };

        Self {
            kind,
            mode,
            len: meta.len(),
        }
    }
}

/// The filesystem operations the extractor needs.
///
/// Implementations must not interpret paths beyond what the host OS does;
/// all security decisions are made by the caller before a mutating method
/// is invoked.
pub trait FileSystem {
    /// Returns metadata for `path`, following symlinks.
    fn stat(&self, path: &Path) -> io::Result<FileInfo>;

    /// Returns metadata for `path` without following a final symlink.
    fn lstat(&self, path: &Path) -> io::Result<FileInfo>;

    /// Opens `path` for reading.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>>;

    /// Opens `path` for writing, creating it with `mode` if it does not
    /// exist and truncating it if it does.
    fn open_file(&self, path: &Path, mode: u32) -> io::Result<Box<dyn Write>>;

    /// Creates `path` and every missing parent with `mode`.
    fn mkdir_all(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Sets the permission bits of `path`.
    fn chmod(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Creates a symbolic link at `link` whose content is `target`.
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

    /// Creates a hard link at `link` to the existing file `target`.
    fn link(&self, target: &Path, link: &Path) -> io::Result<()>;

    /// Resolves every symlink in `path`, returning an absolute path.
    ///
    /// Fails if any component does not exist.
    fn eval_symlinks(&self, path: &Path) -> io::Result<PathBuf>;

    /// Returns the content of the symlink at `path`.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        (**self).stat(path)
    }

    fn lstat(&self, path: &Path) -> io::Result<FileInfo> {
        (**self).lstat(path)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        (**self).open(path)
    }

    fn open_file(&self, path: &Path, mode: u32) -> io::Result<Box<dyn Write>> {
        (**self).open_file(path, mode)
    }

    fn mkdir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        (**self).mkdir_all(path, mode)
    }

    fn chmod(&self, path: &Path, mode: u32) -> io::Result<()> {
        (**self).chmod(path, mode)
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        (**self).symlink(target, link)
    }

    fn link(&self, target: &Path, link: &Path) -> io::Result<()> {
        (**self).link(target, link)
    }

    fn eval_symlinks(&self, path: &Path) -> io::Result<PathBuf> {
        (**self).eval_symlinks(path)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        (**self).read_link(path)
    }
}

/// [`FileSystem`] backed by the host operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        fs::metadata(path).map(|meta| FileInfo::from(&meta))
    }

    fn lstat(&self, path: &Path) -> io::Result<FileInfo> {
        fs::symlink_metadata(path).map(|meta| FileInfo::from(&meta))
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(File::open(path)?))
    }

    fn open_file(&self, path: &Path, mode: u32) -> io::Result<Box<dyn Write>> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        Ok(Box::new(options.open(path)?))
    }

    fn mkdir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        builder.create(path)
    }

    fn chmod(&self, path: &Path, mode: u32) -> io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(mode))
        }
        // Only the owner-write bit maps onto Windows permissions.
        #[cfg(not(unix))]
        {
            let mut permissions = fs::metadata(path)?.permissions();
            permissions.set_readonly(mode & 0o200 == 0);
            fs::set_permissions(path, permissions)
        }
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link)
        }
        #[cfg(not(unix))]
        {
            let _ = (target, link);
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "symlinks are only supported on unix platforms",
            ))
        }
    }

    fn link(&self, target: &Path, link: &Path) -> io::Result<()> {
        fs::hard_link(target, link)
    }

    fn eval_symlinks(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        fs::read_link(path)
    }
}
