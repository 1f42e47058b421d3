//! Decompression and tar entry iteration.
//!
//! Two seams keep the extractor independent of concrete formats:
//!
//! - [`Codec`] turns the raw archive byte stream into a decompressed one.
//! - [`EntryCursor`] walks tar headers sequentially and reads the data of
//!   the current entry.

use std::io;
use std::io::Cursor;
use std::io::Read;

use flate2::read::MultiGzDecoder;

use crate::types::ArchiveEntry;
use crate::types::EntryType;
use crate::types::HeaderField;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Produces a decompressing reader over an archive byte stream.
pub trait Codec {
    /// Wraps `source` in a decompressor.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is not in the codec's format. Errors
    /// in the compressed body surface later, from reads.
    fn decompress<'a>(&self, source: Box<dyn Read + 'a>) -> io::Result<Box<dyn Read + 'a>>;
}

/// Gzip codec. Concatenated gzip members are decoded as one stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct GzipCodec;

impl Codec for GzipCodec {
    fn decompress<'a>(&self, mut source: Box<dyn Read + 'a>) -> io::Result<Box<dyn Read + 'a>> {
        let mut magic = [0u8; 2];
        source.read_exact(&mut magic).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                io::Error::new(io::ErrorKind::InvalidData, "archive is too short to be gzip data")
            } else {
                e
            }
        })?;

        if magic != GZIP_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "archive is not gzip-compressed",
            ));
        }

        Ok(Box::new(MultiGzDecoder::new(Cursor::new(magic).chain(source))))
    }
}

/// Sequential cursor over archive entries.
///
/// `Read` yields the data of the entry most recently returned by
/// [`next_entry`](Self::next_entry), bounded to its declared size. Unread
/// data is skipped when the cursor advances.
pub trait EntryCursor: Read {
    /// Advances to the next entry. `Ok(None)` marks the end of the archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the next header cannot be read or decoded.
    fn next_entry(&mut self) -> io::Result<Option<ArchiveEntry>>;
}

/// [`EntryCursor`] backed by the `tar` crate.
///
/// GNU long names and PAX path records are folded into the entry they
/// describe, so [`ArchiveEntry::name`] is always the full name.
pub struct TarCursor<'a, R: Read + 'a> {
    entries: tar::Entries<'a, R>,
    current: Option<tar::Entry<'a, R>>,
}

impl<'a, R: Read + 'a> TarCursor<'a, R> {
    /// Creates a cursor over `archive`.
    ///
    /// # Errors
    ///
    /// Fails if the archive has already been partially consumed.
    pub fn new(archive: &'a mut tar::Archive<R>) -> io::Result<Self> {
        Ok(Self {
            entries: archive.entries()?,
            current: None,
        })
    }
}

impl<R: Read> EntryCursor for TarCursor<'_, R> {
    fn next_entry(&mut self) -> io::Result<Option<ArchiveEntry>> {
        self.current = None;

        let Some(entry) = self.entries.next().transpose()? else {
            return Ok(None);
        };

        let header = entry.header();
        let (name, name_ok) = decode_field(&entry.path_bytes());
        let (linkname, linkname_ok) = entry
            .link_name_bytes()
            .map_or((String::new(), true), |bytes| decode_field(&bytes));
        let non_utf8 = if !name_ok {
            Some(HeaderField::Name)
        } else if !linkname_ok {
            Some(HeaderField::Linkname)
        } else {
            None
        };
        let decoded = ArchiveEntry {
            name,
            entry_type: EntryType::from(header.entry_type()),
            mode: header.mode()?,
            size: entry.size(),
            linkname,
            non_utf8,
        };

        self.current = Some(entry);
        Ok(Some(decoded))
    }
}

/// Decodes a header field, reporting whether its bytes were valid UTF-8.
fn decode_field(bytes: &[u8]) -> (String, bool) {
    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_owned(), true),
        Err(_) => (String::from_utf8_lossy(bytes).into_owned(), false),
    }
}

impl<R: Read> Read for TarCursor<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.current.as_mut() {
            Some(entry) => entry.read(buf),
            None => Ok(0),
        }
    }
}
