//! Archive entry type enumeration.

/// Type of entry in a tar archive, as far as extraction is concerned.
///
/// Tar type flags are collapsed into the five categories the extractor
/// dispatches on. Everything the extractor does not materialize (character
/// and block devices, FIFOs, tar-internal metadata records) becomes
/// [`EntryType::Other`], which keeps the raw type flag for logging.
///
/// # Examples
///
/// ```
/// use goinstall_core::types::EntryType;
///
/// assert_eq!(EntryType::from(tar::EntryType::Regular), EntryType::RegularFile);
/// assert_eq!(EntryType::from(tar::EntryType::Link), EntryType::HardLink);
/// assert!(EntryType::from(tar::EntryType::Char).is_other());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Directory entry.
    Directory,

    /// Regular file entry.
    RegularFile,

    /// Symbolic link entry.
    Symlink,

    /// Hard link entry.
    HardLink,

    /// Any other entry type; skipped during extraction.
    Other(u8),
}

impl EntryType {
    /// Returns `true` if this is a regular file.
    #[must_use]
    pub const fn is_regular_file(&self) -> bool {
        matches!(self, Self::RegularFile)
    }

    /// Returns `true` if this is a directory.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self, Self::Directory)
    }

    /// Returns `true` if this is a symlink.
    #[must_use]
    pub const fn is_symlink(&self) -> bool {
        matches!(self, Self::Symlink)
    }

    /// Returns `true` if this is a hardlink.
    #[must_use]
    pub const fn is_hardlink(&self) -> bool {
        matches!(self, Self::HardLink)
    }

    /// Returns `true` if this entry is skipped during extraction.
    #[must_use]
    pub const fn is_other(&self) -> bool {
        matches!(self, Self::Other(_))
    }

    /// Short lowercase name used in log events.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::RegularFile => "file",
            Self::Symlink => "symlink",
            Self::HardLink => "hardlink",
            Self::Other(_) => "other",
        }
    }
}

impl From<tar::EntryType> for EntryType {
    fn from(kind: tar::EntryType) -> Self {
        match kind {
            // The tar crate expands sparse entries when reading, so they
            // materialize like regular files.
            tar::EntryType::Regular | tar::EntryType::Continuous | tar::EntryType::GNUSparse => {
                Self::RegularFile
            }
            tar::EntryType::Directory => Self::Directory,
            tar::EntryType::Symlink => Self::Symlink,
            tar::EntryType::Link => Self::HardLink,
            other => Self::Other(other.as_byte()),
        }
    }
}
