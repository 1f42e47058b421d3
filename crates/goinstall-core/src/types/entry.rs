//! Decoded tar header.

use super::EntryType;

/// One decoded tar header.
///
/// All string fields are taken verbatim from the archive and are
/// attacker-controlled; nothing here has been validated. Non-UTF-8 bytes are
/// replaced with `U+FFFD` and the field is named in [`non_utf8`], so two
/// distinct byte names can never be mistaken for one another.
///
/// [`non_utf8`]: Self::non_utf8
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Raw entry name.
    pub name: String,
    /// Entry type.
    pub entry_type: EntryType,
    /// Permission bits from the header (may include setuid/setgid/sticky).
    pub mode: u32,
    /// Declared size in bytes; only meaningful for regular files.
    pub size: u64,
    /// Link target; only meaningful for symlinks and hardlinks.
    pub linkname: String,
    /// First header field whose raw bytes were not valid UTF-8.
    pub non_utf8: Option<HeaderField>,
}

/// A string field of a tar header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    /// The entry name.
    Name,
    /// The link target.
    Linkname,
}

impl ArchiveEntry {
    /// Creates a directory entry.
    pub fn directory(name: impl Into<String>, mode: u32) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::Directory,
            mode,
            size: 0,
            linkname: String::new(),
            non_utf8: None,
        }
    }

    /// Creates a regular file entry declaring `size` bytes.
    pub fn file(name: impl Into<String>, mode: u32, size: u64) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::RegularFile,
            mode,
            size,
            linkname: String::new(),
            non_utf8: None,
        }
    }

    /// Creates a symlink entry.
    pub fn symlink(name: impl Into<String>, linkname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::Symlink,
            mode: 0o777,
            size: 0,
            linkname: linkname.into(),
            non_utf8: None,
        }
    }

    /// Creates a hardlink entry.
    pub fn hardlink(name: impl Into<String>, linkname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::HardLink,
            mode: 0o644,
            size: 0,
            linkname: linkname.into(),
            non_utf8: None,
        }
    }

    /// Creates an entry of a type the extractor skips.
    pub fn other(name: impl Into<String>, type_flag: u8) -> Self {
        Self {
            name: name.into(),
            entry_type: EntryType::Other(type_flag),
            mode: 0o644,
            size: 0,
            linkname: String::new(),
            non_utf8: None,
        }
    }

    /// Marks `field` as decoded from bytes that were not valid UTF-8.
    #[must_use]
    pub const fn with_non_utf8(mut self, field: HeaderField) -> Self {
        self.non_utf8 = Some(field);
        self
    }

    /// Permission bits applied to the extracted node.
    #[must_use]
    pub const fn permissions(&self) -> u32 {
        self.mode & 0o777
    }
}
