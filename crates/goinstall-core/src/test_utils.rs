//! Test utilities for building archives and observing the extractor.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::VecDeque;
use std::io;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::codec::EntryCursor;
use crate::fs::FileInfo;
use crate::fs::FileSystem;
use crate::fs::OsFileSystem;
use crate::types::ArchiveEntry;

/// Gzip-compresses `data`.
///
/// # Examples
///
/// ```
/// use goinstall_core::test_utils::gzip;
///
/// let compressed = gzip(b"hello");
/// assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
/// ```
#[must_use]
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Writes `data` to `dir/name` and returns the full path.
pub fn write_archive(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

/// Builder for tar test archives, including entries the `tar` crate's
/// builder would refuse to write.
///
/// # Examples
///
/// ```
/// use goinstall_core::test_utils::TarTestBuilder;
///
/// let tar_gz = TarTestBuilder::new()
///     .add_directory("go/", 0o755)
///     .add_file("go/VERSION", b"go1.21.0", 0o644)
///     .add_symlink("go/latest", "VERSION")
///     .add_raw_entry(b"../escape", tar::EntryType::Regular, b"", b"x")
///     .build_gz();
/// ```
pub struct TarTestBuilder {
    builder: tar::Builder<Vec<u8>>,
}

impl TarTestBuilder {
    /// Creates a new TAR test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(Vec::new()),
        }
    }

    fn header(entry_type: tar::EntryType, size: u64, mode: u32) -> tar::Header {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(entry_type);
        header.set_size(size);
        header.set_mode(mode);
        header.set_mtime(0);
        header
    }

    /// Adds a regular file.
    #[must_use]
    pub fn add_file(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        let mut header = Self::header(tar::EntryType::Regular, data.len() as u64, mode);
        self.builder.append_data(&mut header, path, data).unwrap();
        self
    }

    /// Adds a regular file whose header declares `declared` bytes while the
    /// archive carries `data`.
    #[must_use]
    pub fn add_file_declaring(mut self, path: &str, declared: u64, data: &[u8]) -> Self {
        let mut header = Self::header(tar::EntryType::Regular, declared, 0o644);
        header.set_path(path).unwrap();
        header.set_cksum();
        self.builder.append(&header, data).unwrap();
        self
    }

    /// Adds a directory.
    #[must_use]
    pub fn add_directory(mut self, path: &str, mode: u32) -> Self {
        let mut header = Self::header(tar::EntryType::Directory, 0, mode);
        self.builder
            .append_data(&mut header, path, io::empty())
            .unwrap();
        self
    }

    /// Adds a symlink.
    #[must_use]
    pub fn add_symlink(mut self, path: &str, target: &str) -> Self {
        let mut header = Self::header(tar::EntryType::Symlink, 0, 0o777);
        self.builder.append_link(&mut header, path, target).unwrap();
        self
    }

    /// Adds a hardlink.
    #[must_use]
    pub fn add_hardlink(mut self, path: &str, target: &str) -> Self {
        let mut header = Self::header(tar::EntryType::Link, 0, 0o644);
        self.builder.append_link(&mut header, path, target).unwrap();
        self
    }

    /// Adds a character device entry.
    #[must_use]
    pub fn add_char_device(mut self, path: &str) -> Self {
        let mut header = Self::header(tar::EntryType::Char, 0, 0o600);
        header.set_device_major(1).unwrap();
        header.set_device_minor(3).unwrap();
        self.builder
            .append_data(&mut header, path, io::empty())
            .unwrap();
        self
    }

    /// Adds an entry whose name and link target are written verbatim into
    /// the header, bypassing the builder's path checks. Both must fit in
    /// 100 bytes.
    #[must_use]
    pub fn add_raw_entry(
        mut self,
        name: &[u8],
        entry_type: tar::EntryType,
        linkname: &[u8],
        data: &[u8],
    ) -> Self {
        let mut header = Self::header(entry_type, data.len() as u64, 0o644);
        {
            let old = header.as_old_mut();
            old.name[..name.len()].copy_from_slice(name);
            old.linkname[..linkname.len()].copy_from_slice(linkname);
        }
        header.set_cksum();
        self.builder.append(&header, data).unwrap();
        self
    }

    /// Returns the uncompressed tar bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.builder.into_inner().unwrap()
    }

    /// Returns the tar bytes gzip-compressed.
    #[must_use]
    pub fn build_gz(self) -> Vec<u8> {
        gzip(&self.build())
    }
}

impl Default for TarTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One call observed by [`RecordingFs`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum FsCall {
    Stat(PathBuf),
    Lstat(PathBuf),
    Open(PathBuf),
    OpenFile(PathBuf, u32),
    MkdirAll(PathBuf, u32),
    Chmod(PathBuf, u32),
    Symlink { target: PathBuf, link: PathBuf },
    Link { target: PathBuf, link: PathBuf },
    EvalSymlinks(PathBuf),
    ReadLink(PathBuf),
}

impl FsCall {
    /// Returns `true` for calls that change the filesystem.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::OpenFile(..)
                | Self::MkdirAll(..)
                | Self::Chmod(..)
                | Self::Symlink { .. }
                | Self::Link { .. }
        )
    }
}

/// [`FileSystem`] that forwards to the host OS and records every call.
#[derive(Debug, Default)]
pub struct RecordingFs {
    inner: OsFileSystem,
    calls: Mutex<Vec<FsCall>>,
}

impl RecordingFs {
    /// Creates a recorder with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: FsCall) {
        self.calls.lock().unwrap().push(call);
    }

    /// Returns every call made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<FsCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the calls that changed the filesystem.
    #[must_use]
    pub fn mutations(&self) -> Vec<FsCall> {
        self.calls().into_iter().filter(FsCall::is_mutation).collect()
    }

    /// Clears the call log.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl FileSystem for RecordingFs {
    fn stat(&self, path: &Path) -> io::Result<FileInfo> {
        self.record(FsCall::Stat(path.to_path_buf()));
        self.inner.stat(path)
    }

    fn lstat(&self, path: &Path) -> io::Result<FileInfo> {
        self.record(FsCall::Lstat(path.to_path_buf()));
        self.inner.lstat(path)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        self.record(FsCall::Open(path.to_path_buf()));
        self.inner.open(path)
    }

    fn open_file(&self, path: &Path, mode: u32) -> io::Result<Box<dyn Write>> {
        self.record(FsCall::OpenFile(path.to_path_buf(), mode));
        self.inner.open_file(path, mode)
    }

    fn mkdir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        self.record(FsCall::MkdirAll(path.to_path_buf(), mode));
        self.inner.mkdir_all(path, mode)
    }

    fn chmod(&self, path: &Path, mode: u32) -> io::Result<()> {
        self.record(FsCall::Chmod(path.to_path_buf(), mode));
        self.inner.chmod(path, mode)
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        self.record(FsCall::Symlink {
            target: target.to_path_buf(),
            link: link.to_path_buf(),
        });
        self.inner.symlink(target, link)
    }

    fn link(&self, target: &Path, link: &Path) -> io::Result<()> {
        self.record(FsCall::Link {
            target: target.to_path_buf(),
            link: link.to_path_buf(),
        });
        self.inner.link(target, link)
    }

    fn eval_symlinks(&self, path: &Path) -> io::Result<PathBuf> {
        self.record(FsCall::EvalSymlinks(path.to_path_buf()));
        self.inner.eval_symlinks(path)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.record(FsCall::ReadLink(path.to_path_buf()));
        self.inner.read_link(path)
    }
}

/// [`EntryCursor`] that replays a fixed list of entries.
///
/// Used to feed the extractor headers no tar writer would produce.
#[derive(Debug, Default)]
pub struct ScriptedCursor {
    pending: VecDeque<io::Result<(ArchiveEntry, Vec<u8>)>>,
    current: Cursor<Vec<u8>>,
}

impl ScriptedCursor {
    /// Creates an empty cursor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an entry without data.
    #[must_use]
    pub fn entry(self, entry: ArchiveEntry) -> Self {
        self.entry_with_data(entry, Vec::new())
    }

    /// Queues an entry followed by `data`.
    #[must_use]
    pub fn entry_with_data(mut self, entry: ArchiveEntry, data: impl Into<Vec<u8>>) -> Self {
        self.pending.push_back(Ok((entry, data.into())));
        self
    }

    /// Queues a header read failure.
    #[must_use]
    pub fn error(mut self, kind: io::ErrorKind) -> Self {
        self.pending
            .push_back(Err(io::Error::new(kind, "scripted header failure")));
        self
    }
}

impl Read for ScriptedCursor {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.current.read(buf)
    }
}

impl EntryCursor for ScriptedCursor {
    fn next_entry(&mut self) -> io::Result<Option<ArchiveEntry>> {
        match self.pending.pop_front() {
            None => {
                self.current = Cursor::new(Vec::new());
                Ok(None)
            }
            Some(Ok((entry, data))) => {
                self.current = Cursor::new(data);
                Ok(Some(entry))
            }
            Some(Err(e)) => Err(e),
        }
    }
}
